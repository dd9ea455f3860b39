//! Errors surfaced by the database facade
//!
//! Storage and query failures keep their own codes and severities; the
//! facade only adds configuration and lock failures on top.

use thiserror::Error;

use crate::query::QueryError;
use crate::storage::StorageError;

/// Result type for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Database facade errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Filesystem or on-disk format failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Query rejected before or during evaluation
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Configuration file missing, malformed or invalid
    #[error("[ERROR] FLAT_CONFIG_ERROR: {0}")]
    Config(String),

    /// A previous operation panicked while holding the store lock
    #[error("[FATAL] FLAT_LOCK_POISONED: store lock poisoned by a panicked operation")]
    LockPoisoned,
}

impl DatabaseError {
    /// Creates a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        DatabaseError::Config(message.into())
    }

    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            DatabaseError::Storage(e) => e.code().code(),
            DatabaseError::Query(e) => e.code().code(),
            DatabaseError::Config(_) => "FLAT_CONFIG_ERROR",
            DatabaseError::LockPoisoned => "FLAT_LOCK_POISONED",
        }
    }

    /// Human-readable message without the code prefix
    pub fn message(&self) -> String {
        match self {
            DatabaseError::Storage(e) => match e.details() {
                Some(details) => format!("{} ({})", e.message(), details),
                None => e.message().to_string(),
            },
            DatabaseError::Query(e) => e.message().to_string(),
            DatabaseError::Config(message) => message.clone(),
            DatabaseError::LockPoisoned => "store lock poisoned".to_string(),
        }
    }

    /// Returns true if the store can no longer be trusted
    pub fn is_fatal(&self) -> bool {
        match self {
            DatabaseError::Storage(e) => e.is_fatal(),
            DatabaseError::LockPoisoned => true,
            _ => false,
        }
    }
}
