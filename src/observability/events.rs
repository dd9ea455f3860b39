//! Observability events for flatdb
//!
//! Events are explicit and typed; each one carries its own severity.

use std::fmt;

use super::logger::Severity;

/// Observable events in flatdb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Configuration loaded and validated
    ConfigLoaded,
    /// Store handle opened (file created if absent)
    DbOpened,
    /// Record appended as an `E` line
    RecordInserted,
    /// Query executed successfully
    QueryExecuted,
    /// Query rejected (unsupported shape, comparison or field type)
    QueryRejected,
    /// Matching lines flipped to `D`
    RecordsTombstoned,
    /// Filesystem failure while reading or writing the log
    StorageFailed,
    /// A log line could not be parsed
    CorruptRecord,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::DbOpened => "DB_OPENED",
            Event::RecordInserted => "RECORD_INSERTED",
            Event::QueryExecuted => "QUERY_EXECUTED",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::RecordsTombstoned => "RECORDS_TOMBSTONED",
            Event::StorageFailed => "STORAGE_FAILED",
            Event::CorruptRecord => "CORRUPT_RECORD",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::CorruptRecord => Severity::Fatal,
            Event::StorageFailed => Severity::Error,
            Event::QueryRejected => Severity::Warn,
            Event::RecordInserted => Severity::Trace,
            _ => Severity::Info,
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
