//! Log line codec
//!
//! Every record occupies exactly one line of the log file:
//!
//! ```text
//! <marker><json-object>\n
//! ```
//!
//! The marker is `E` for an active record and `D` for a tombstone. There is
//! no whitespace between the marker and the JSON body. JSON string escaping
//! guarantees the body never contains a raw newline.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::errors::{StorageError, StorageResult};

/// Status marker at the start of every log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Active record (`E`)
    Existing,
    /// Tombstoned record (`D`)
    Deleted,
}

impl Marker {
    /// Returns the on-disk character for this marker
    pub const fn as_char(&self) -> char {
        match self {
            Marker::Existing => 'E',
            Marker::Deleted => 'D',
        }
    }

    /// Parses an on-disk marker character
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'E' => Some(Marker::Existing),
            'D' => Some(Marker::Deleted),
            _ => None,
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Identity of a log line: zero-based line index and starting byte offset.
///
/// Lines are never removed or reordered, so a position stays valid for the
/// life of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinePosition {
    /// Zero-based index among non-empty lines
    pub line: usize,
    /// Byte offset of the marker character
    pub offset: u64,
}

impl LinePosition {
    pub fn new(line: usize, offset: u64) -> Self {
        Self { line, offset }
    }
}

/// A classified line read back from the log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Where the line lives in the file
    pub position: LinePosition,
    /// Status marker
    pub marker: Marker,
    /// Full line content, marker included, newline excluded
    pub text: String,
}

impl LogLine {
    /// Returns true for `E` lines
    pub fn is_active(&self) -> bool {
        self.marker == Marker::Existing
    }

    /// Returns the JSON body without the marker
    pub fn body(&self) -> &str {
        self.text.get(1..).unwrap_or("")
    }

    /// Decodes the body, attaching this line's position to any failure
    pub fn decode<T: DeserializeOwned>(&self) -> StorageResult<T> {
        decode(&self.text).map_err(|e| e.at(self.position.line, self.position.offset))
    }
}

/// Encodes a record as an active log line (without the trailing newline).
///
/// Field order follows the serializer, so two structurally identical records
/// always produce identical lines.
pub fn encode<T: Serialize>(record: &T) -> StorageResult<String> {
    let value = serde_json::to_value(record)
        .map_err(|e| StorageError::invalid_record(format!("Failed to serialize record: {}", e)))?;

    if !value.is_object() {
        return Err(StorageError::invalid_record(format!(
            "Record must serialize to a JSON object, got {}",
            json_type_name(&value)
        )));
    }

    let body = serde_json::to_string(&value)
        .map_err(|e| StorageError::invalid_record(format!("Failed to serialize record: {}", e)))?;

    let mut line = String::with_capacity(body.len() + 1);
    line.push(Marker::Existing.as_char());
    line.push_str(&body);
    Ok(line)
}

/// Decodes a log line (marker included) into a record.
///
/// The marker is validated but otherwise ignored, so tombstones decode too.
pub fn decode<T: DeserializeOwned>(line: &str) -> StorageResult<T> {
    let first = line
        .chars()
        .next()
        .ok_or_else(|| StorageError::corrupt_record("Empty log line"))?;

    if Marker::from_char(first).is_none() {
        return Err(StorageError::corrupt_record(format!(
            "Unknown marker '{}'",
            first.escape_debug()
        )));
    }

    serde_json::from_str(&line[first.len_utf8()..])
        .map_err(|e| StorageError::corrupt_record(format!("Malformed record body: {}", e)))
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
