//! Storage error types
//!
//! Error codes:
//! - FLAT_STORAGE_IO_ERROR (ERROR severity)
//! - FLAT_INVALID_RECORD (ERROR severity)
//! - FLAT_STALE_TARGET (ERROR severity)
//! - FLAT_CORRUPT_RECORD (FATAL severity)

use std::fmt;
use std::io;

/// Severity levels for storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, the store stays usable
    Error,
    /// The log file cannot be trusted until repaired by hand
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// File read/write failure
    FlatStorageIoError,
    /// A record that cannot be written as a log line
    FlatInvalidRecord,
    /// A marker rewrite target no longer matches the file
    FlatStaleTarget,
    /// A log line that cannot be parsed
    FlatCorruptRecord,
}

impl StorageErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::FlatStorageIoError => "FLAT_STORAGE_IO_ERROR",
            StorageErrorCode::FlatInvalidRecord => "FLAT_INVALID_RECORD",
            StorageErrorCode::FlatStaleTarget => "FLAT_STALE_TARGET",
            StorageErrorCode::FlatCorruptRecord => "FLAT_CORRUPT_RECORD",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StorageErrorCode::FlatCorruptRecord => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error type with full context
#[derive(Debug)]
pub struct StorageError {
    /// Error code
    code: StorageErrorCode,
    /// Human-readable message
    message: String,
    /// Optional details about the error context
    details: Option<String>,
    /// Underlying IO error if applicable
    source: Option<io::Error>,
}

impl StorageError {
    /// Create a new storage I/O error
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::FlatStorageIoError,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Create an invalid record error (record rejected before it reaches disk)
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::FlatInvalidRecord,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a stale target error for a marker rewrite
    pub fn stale_target(line: usize, reason: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::FlatStaleTarget,
            message: reason.into(),
            details: Some(format!("line: {}", line)),
            source: None,
        }
    }

    /// Create a corrupt record error without position context
    pub fn corrupt_record(message: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::FlatCorruptRecord,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a corrupt record error with line and byte offset context
    pub fn corrupt_at(line: usize, offset: u64, reason: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::FlatCorruptRecord,
            message: reason.into(),
            details: Some(format!("line: {}, byte_offset: {}", line, offset)),
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StorageErrorCode {
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

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether the log file itself is damaged
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Attaches position context to an error produced without it
    pub(crate) fn at(mut self, line: usize, offset: u64) -> Self {
        self.details = Some(format!("line: {}, byte_offset: {}", line, offset));
        self
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
