//! Sequential log reader
//!
//! The whole file is read into memory on open and the handle is released
//! immediately; lines are then classified one at a time. Blank segments
//! (including the one after the trailing newline) are skipped and do not
//! consume a line index.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::record::{LinePosition, LogLine, Marker};

/// Storage reader for full scans of the log file.
///
/// Unknown markers are reported as corruption; bodies are not parsed here.
pub struct StorageReader {
    /// Path to the storage file
    storage_path: PathBuf,
    /// File content at the time of open
    content: String,
    /// Current byte offset
    current_offset: usize,
    /// Index of the next non-empty line
    next_line: usize,
}

impl StorageReader {
    /// Reads the storage file into memory.
    pub fn open(storage_path: &Path) -> StorageResult<Self> {
        let content = fs::read_to_string(storage_path).map_err(|e| {
            if e.kind() == io::ErrorKind::InvalidData {
                StorageError::corrupt_record(format!(
                    "Storage file is not valid UTF-8: {}",
                    storage_path.display()
                ))
            } else {
                StorageError::io_error(
                    format!("Failed to read storage file: {}", storage_path.display()),
                    e,
                )
            }
        })?;

        Ok(Self {
            storage_path: storage_path.to_path_buf(),
            content,
            current_offset: 0,
            next_line: 0,
        })
    }

    /// Returns the storage file path.
    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    /// Number of non-empty lines in the file, regardless of marker.
    ///
    /// This is the line index the next appended line will receive.
    pub fn line_count(&self) -> usize {
        self.content.split('\n').filter(|s| !s.is_empty()).count()
    }

    /// Reads the next non-empty line.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(line))` if a line was read
    /// - `Ok(None)` at end of file
    /// - `Err(FLAT_CORRUPT_RECORD)` if the line has no recognised marker
    pub fn read_next(&mut self) -> StorageResult<Option<LogLine>> {
        while self.current_offset < self.content.len() {
            let start = self.current_offset;
            let end = self.content[start..]
                .find('\n')
                .map(|i| start + i)
                .unwrap_or(self.content.len());
            self.current_offset = (end + 1).min(self.content.len());

            let text = &self.content[start..end];
            if text.is_empty() {
                continue;
            }

            let position = LinePosition::new(self.next_line, start as u64);
            self.next_line += 1;

            let first = text.chars().next().unwrap_or_default();
            let marker = Marker::from_char(first).ok_or_else(|| {
                StorageError::corrupt_at(
                    position.line,
                    position.offset,
                    format!("Unknown marker '{}'", first.escape_debug()),
                )
            })?;

            return Ok(Some(LogLine {
                position,
                marker,
                text: text.to_string(),
            }));
        }

        Ok(None)
    }

    /// Reads every remaining line.
    ///
    /// Any corruption causes immediate failure.
    pub fn read_all(&mut self) -> StorageResult<Vec<LogLine>> {
        let mut lines = Vec::new();

        while let Some(line) = self.read_next()? {
            lines.push(line);
        }

        Ok(lines)
    }
}
