//! Store configuration
//!
//! Loaded from a JSON file:
//!
//! ```json
//! { "path": "./data/books.db", "full_text_fields": ["title"], "log_level": "info" }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{DatabaseError, DatabaseResult};
use crate::observability::Severity;

/// Configuration for one store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Log file path (required)
    pub path: PathBuf,

    /// Fields searched by `$text`, in order (optional, default none)
    #[serde(default)]
    pub full_text_fields: Vec<String>,

    /// Minimum log severity (optional, default "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl DatabaseConfig {
    /// Configuration with defaults for everything but the path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            full_text_fields: Vec::new(),
            log_level: default_log_level(),
        }
    }

    /// Sets the full-text field list
    pub fn with_full_text_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.full_text_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Load configuration from file
    ///
    /// A relative `path` is resolved against the config file's directory.
    pub fn load(path: &Path) -> DatabaseResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| DatabaseError::config(format!("Failed to read config: {}", e)))?;

        let mut config: DatabaseConfig = serde_json::from_str(&content)
            .map_err(|e| DatabaseError::config(format!("Invalid config JSON: {}", e)))?;

        if config.path.is_relative() {
            if let Some(base) = path.parent() {
                config.path = base.join(&config.path);
            }
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> DatabaseResult<()> {
        if self.path.as_os_str().is_empty() {
            return Err(DatabaseError::config("path must not be empty"));
        }

        let mut seen = HashSet::new();
        for field in &self.full_text_fields {
            if field.is_empty() {
                return Err(DatabaseError::config(
                    "full_text_fields must not contain empty names",
                ));
            }
            if !seen.insert(field.as_str()) {
                return Err(DatabaseError::config(format!(
                    "Duplicate full-text field: '{}'",
                    field
                )));
            }
        }

        self.severity()?;

        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> DatabaseResult<Severity> {
        self.log_level.parse().map_err(DatabaseError::config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("flatdb.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_config_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, r#"{"path": "books.db"}"#);

        let config = DatabaseConfig::load(&path).unwrap();
        assert_eq!(config.path, temp_dir.path().join("books.db"));
        assert!(config.full_text_fields.is_empty());
        assert_eq!(config.severity().unwrap(), Severity::Warn);
    }

    #[test]
    fn test_absolute_path_kept() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("abs.db");
        let content = serde_json::json!({"path": target, "full_text_fields": ["title"]});
        let path = write_config(&temp_dir, &content.to_string());

        let config = DatabaseConfig::load(&path).unwrap();
        assert_eq!(config.path, target);
        assert_eq!(config.full_text_fields, vec!["title".to_string()]);
    }

    #[test]
    fn test_config_rejects_duplicate_fields() {
        let config = DatabaseConfig::new("x.db").with_full_text_fields(["title", "title"]);
        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), "FLAT_CONFIG_ERROR");
    }

    #[test]
    fn test_config_rejects_empty_field_and_path() {
        assert!(DatabaseConfig::new("x.db")
            .with_full_text_fields([""])
            .validate()
            .is_err());
        assert!(DatabaseConfig::new("").validate().is_err());
    }

    #[test]
    fn test_config_rejects_unknown_log_level() {
        let mut config = DatabaseConfig::new("x.db");
        config.log_level = "chatty".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_malformed_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(&temp_dir, "{not json");

        let err = DatabaseConfig::load(&path).unwrap_err();
        assert!(err.message().starts_with("Invalid config JSON"));
    }

    #[test]
    fn test_missing_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = DatabaseConfig::load(&temp_dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.code(), "FLAT_CONFIG_ERROR");
    }
}
