//! Query error types
//!
//! Error codes:
//! - FLAT_UNSUPPORTED_QUERY (REJECT)
//! - FLAT_UNSUPPORTED_COMPARISON (REJECT)
//! - FLAT_UNSUPPORTED_FIELD_TYPE (REJECT)
//!
//! Every query error aborts the operation before any result is returned.

use std::fmt;

/// Severity levels for query errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Query-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorCode {
    /// Query or options shape not recognised
    FlatUnsupportedQuery,
    /// `$gt` / `$lt` applied to values without a natural order
    FlatUnsupportedComparison,
    /// Full-text field holding a non-string value
    FlatUnsupportedFieldType,
}

impl QueryErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            QueryErrorCode::FlatUnsupportedQuery => "FLAT_UNSUPPORTED_QUERY",
            QueryErrorCode::FlatUnsupportedComparison => "FLAT_UNSUPPORTED_COMPARISON",
            QueryErrorCode::FlatUnsupportedFieldType => "FLAT_UNSUPPORTED_FIELD_TYPE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Query error type with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    /// Error code
    code: QueryErrorCode,
    /// Human-readable message
    message: String,
    /// Field name if applicable
    field: Option<String>,
}

impl QueryError {
    /// Create an unsupported query error
    pub fn unsupported_query(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::FlatUnsupportedQuery,
            message: reason.into(),
            field: None,
        }
    }

    /// Create an unsupported query error tied to a field
    pub fn unsupported_operator(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::FlatUnsupportedQuery,
            message: reason.into(),
            field: Some(field.into()),
        }
    }

    /// Create an unsupported comparison error
    pub fn unsupported_comparison(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::FlatUnsupportedComparison,
            message: reason.into(),
            field: Some(field.into()),
        }
    }

    /// Create an unsupported field type error
    pub fn unsupported_field_type(field: impl Into<String>, found: &str) -> Self {
        let f = field.into();
        Self {
            code: QueryErrorCode::FlatUnsupportedFieldType,
            message: format!("Full-text field '{}' holds a {}, expected a string", f, found),
            field: Some(f),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> QueryErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the field name if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref field) = self.field {
            write!(f, " (field: {})", field)?;
        }
        Ok(())
    }
}

impl std::error::Error for QueryError {}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            QueryErrorCode::FlatUnsupportedQuery.code(),
            "FLAT_UNSUPPORTED_QUERY"
        );
        assert_eq!(
            QueryErrorCode::FlatUnsupportedComparison.code(),
            "FLAT_UNSUPPORTED_COMPARISON"
        );
        assert_eq!(
            QueryErrorCode::FlatUnsupportedFieldType.code(),
            "FLAT_UNSUPPORTED_FIELD_TYPE"
        );
    }

    #[test]
    fn test_error_display() {
        let err = QueryError::unsupported_field_type("title", "number");
        let display = format!("{}", err);
        assert!(display.contains("REJECT"));
        assert!(display.contains("FLAT_UNSUPPORTED_FIELD_TYPE"));
        assert!(display.contains("title"));
        assert_eq!(err.field(), Some("title"));
    }
}
