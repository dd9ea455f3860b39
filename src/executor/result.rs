//! Result types for query execution

use serde_json::Value;

use crate::storage::LinePosition;

/// An active record together with the line it was read from
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    /// Line identity in the log file
    pub position: LinePosition,
    /// Exact line content, marker included
    pub line: String,
    /// Decoded record body
    pub body: Value,
}

impl StoredRecord {
    /// Creates a new stored record
    pub fn new(position: LinePosition, line: impl Into<String>, body: Value) -> Self {
        Self {
            position,
            line: line.into(),
            body,
        }
    }
}

/// Result of query execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Matching records in result order
    pub records: Vec<StoredRecord>,
    /// Number of active records examined
    pub scanned_count: usize,
    /// Number of records returned
    pub returned_count: usize,
}

impl ExecutionResult {
    /// Creates a result from matched records
    pub fn new(records: Vec<StoredRecord>, scanned_count: usize) -> Self {
        Self {
            returned_count: records.len(),
            scanned_count,
            records,
        }
    }

    /// Returns true if no records matched
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of results
    pub fn len(&self) -> usize {
        self.records.len()
    }
}
