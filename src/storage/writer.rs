//! Storage writer
//!
//! Two mutations exist:
//! - append a new line at the end of the file
//! - flip the marker of existing `E` lines to `D`
//!
//! Lines are never removed, shortened or reordered, so byte offsets handed
//! out by the reader stay valid for the life of the file.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::record::{LinePosition, Marker};

/// A line selected for tombstoning.
///
/// The expected text guards against rewriting a line the caller never saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerTarget {
    /// Position reported by the reader
    pub position: LinePosition,
    /// Exact line content (with its `E` marker) as last read
    pub text: String,
}

impl MarkerTarget {
    pub fn new(position: LinePosition, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
        }
    }
}

/// Storage writer bound to a single log file.
///
/// Holds no open handle between calls; every operation opens the file,
/// does its work and releases it on all exit paths.
#[derive(Debug, Clone)]
pub struct StorageWriter {
    /// Path to the storage file
    storage_path: PathBuf,
}

impl StorageWriter {
    /// Opens or creates the storage file.
    ///
    /// Creates parent directories if needed. An existing file is left as is.
    pub fn open(storage_path: &Path) -> StorageResult<Self> {
        if let Some(parent) = storage_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    StorageError::io_error(
                        format!("Failed to create data directory: {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(storage_path)
            .map_err(|e| {
                StorageError::io_error(
                    format!("Failed to open storage file: {}", storage_path.display()),
                    e,
                )
            })?;

        Ok(Self {
            storage_path: storage_path.to_path_buf(),
        })
    }

    /// Returns the path to the storage file.
    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    /// Appends one line and fsyncs.
    ///
    /// The line must carry a marker and must not contain a newline.
    /// Returns the byte offset where the line starts. A torn write is not
    /// repaired here.
    pub fn append(&self, line: &str) -> StorageResult<u64> {
        if line.contains('\n') {
            return Err(StorageError::invalid_record("Log line contains a newline"));
        }
        if line.chars().next().and_then(Marker::from_char).is_none() {
            return Err(StorageError::invalid_record("Log line has no marker"));
        }

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.storage_path)
            .map_err(|e| {
                StorageError::io_error(
                    format!("Failed to open storage file: {}", self.storage_path.display()),
                    e,
                )
            })?;

        let offset = file
            .metadata()
            .map_err(|e| StorageError::io_error("Failed to read file metadata", e))?
            .len();

        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');

        file.write_all(&buf)
            .map_err(|e| StorageError::io_error("Failed to append log line", e))?;

        file.sync_all()
            .map_err(|e| StorageError::io_error("fsync failed after append", e))?;

        Ok(offset)
    }

    /// Flips the marker of every target line from `E` to `D`.
    ///
    /// Reads the whole file, patches the marker bytes in memory and replaces
    /// the file through a temp file + rename. Every other byte is carried over
    /// unchanged. Duplicate targets collapse to one rewrite.
    ///
    /// With no targets the file is not touched at all.
    ///
    /// # Errors
    ///
    /// - `FLAT_STALE_TARGET` if a target no longer matches the file
    /// - `FLAT_STORAGE_IO_ERROR` on any filesystem failure; whatever state the
    ///   temp file + rename left behind is not rolled back
    ///
    /// Returns the number of distinct lines tombstoned.
    pub fn rewrite_markers(&self, targets: &[MarkerTarget]) -> StorageResult<usize> {
        if targets.is_empty() {
            return Ok(0);
        }

        let mut content = fs::read(&self.storage_path).map_err(|e| {
            StorageError::io_error(
                format!("Failed to read storage file: {}", self.storage_path.display()),
                e,
            )
        })?;

        let mut by_offset: BTreeMap<u64, &MarkerTarget> = BTreeMap::new();
        for target in targets {
            by_offset.insert(target.position.offset, target);
        }

        for target in by_offset.values() {
            Self::verify_target(&content, target)?;
        }

        for offset in by_offset.keys() {
            content[*offset as usize] = Marker::Deleted.as_char() as u8;
        }

        self.replace_contents(&content)?;

        Ok(by_offset.len())
    }

    /// Checks that the target line is still present, byte-for-byte, and active.
    fn verify_target(content: &[u8], target: &MarkerTarget) -> StorageResult<()> {
        let line = target.position.line;
        let start = target.position.offset as usize;
        let end = start + target.text.len();

        if !target.text.starts_with(Marker::Existing.as_char()) {
            return Err(StorageError::stale_target(line, "Target is not an active line"));
        }

        if end > content.len() || &content[start..end] != target.text.as_bytes() {
            return Err(StorageError::stale_target(
                line,
                "Line content changed since it was read",
            ));
        }

        let at_line_start = start == 0 || content[start - 1] == b'\n';
        let at_line_end = end == content.len() || content[end] == b'\n';
        if !at_line_start || !at_line_end {
            return Err(StorageError::stale_target(
                line,
                "Target does not span a whole line",
            ));
        }

        Ok(())
    }

    /// Writes new contents to a sibling temp file, fsyncs, then renames over
    /// the storage file.
    fn replace_contents(&self, content: &[u8]) -> StorageResult<()> {
        let temp_path = self.temp_path();

        let write_temp = || -> io::Result<()> {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            file.write_all(content)?;
            file.sync_all()
        };

        write_temp().map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StorageError::io_error(
                format!("Failed to write rewrite file: {}", temp_path.display()),
                e,
            )
        })?;

        fs::rename(&temp_path, &self.storage_path).map_err(|e| {
            StorageError::io_error(
                format!("Failed to replace storage file: {}", self.storage_path.display()),
                e,
            )
        })?;

        // fsync the directory so the rename itself is durable
        if let Some(parent) = self.storage_path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .storage_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store".to_string());
        self.storage_path.with_file_name(format!("{}.rewrite", name))
    }
}
