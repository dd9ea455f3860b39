//! Database facade
//!
//! Binds a record type `T` to one log file and exposes the store's
//! operations. Every operation reads the file fresh; nothing is cached
//! between calls.
//!
//! A single in-process lock serializes operations. `delete` holds it across
//! the scan and the marker rewrite so the lines it flips are the lines it
//! matched. There is no cross-process locking.

mod config;
mod errors;

pub use config::DatabaseConfig;
pub use errors::{DatabaseError, DatabaseResult};

use std::marker::PhantomData;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::executor::{ExecutionResult, QueryExecutor, StoredRecord};
use crate::observability::{log_event_with_fields, Event};
use crate::storage::{encode, LinePosition, MarkerTarget, StorageReader, StorageWriter};
use crate::query::{Query, QueryOptions};

/// Line counts from a full scan of the log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Non-empty lines in the file
    pub total: usize,
    /// `E` lines
    pub active: usize,
    /// `D` lines
    pub tombstoned: usize,
}

/// Handle to one store
pub struct Database<T> {
    writer: StorageWriter,
    full_text_fields: Vec<String>,
    lock: Mutex<()>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Database<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Opens the store described by a validated config.
    pub fn open(config: &DatabaseConfig) -> DatabaseResult<Self> {
        config.validate()?;
        Self::open_path(&config.path, config.full_text_fields.clone())
    }

    /// Opens (creating if absent) the log file at `path`.
    ///
    /// Parent directories are created as needed. Existing content is left
    /// untouched and is not validated here.
    pub fn open_path(path: impl AsRef<Path>, full_text_fields: Vec<String>) -> DatabaseResult<Self> {
        let path = path.as_ref();
        let writer = StorageWriter::open(path)
            .map_err(DatabaseError::from)
            .map_err(reported)?;

        let field_count = full_text_fields.len().to_string();
        log_event_with_fields(
            Event::DbOpened,
            &[
                ("path", &path.display().to_string()),
                ("full_text_fields", &field_count),
            ],
        );

        Ok(Self {
            writer,
            full_text_fields,
            lock: Mutex::new(()),
            _record: PhantomData,
        })
    }

    /// Path of the underlying log file
    pub fn path(&self) -> &Path {
        self.writer.path()
    }

    /// Fields searched by `$text`
    pub fn full_text_fields(&self) -> &[String] {
        &self.full_text_fields
    }

    /// Appends one record as a new active line.
    ///
    /// Identical records may be inserted any number of times; each gets its
    /// own line.
    pub fn insert(&self, record: &T) -> DatabaseResult<LinePosition> {
        let _guard = self.acquire()?;
        self.append(record).map_err(reported)
    }

    /// Returns matching active records, sorted then projected if requested.
    ///
    /// Without options, results follow on-disk order (`$or` branch order for
    /// disjunctions).
    pub fn find(&self, query: &Query, options: Option<&QueryOptions>) -> DatabaseResult<Vec<Value>> {
        let _guard = self.acquire()?;
        let result = self.execute(query).map_err(reported)?;
        Ok(QueryExecutor::shape(result.records, options))
    }

    /// Returns matching active records decoded as `T`, unprojected.
    pub fn find_records(&self, query: &Query) -> DatabaseResult<Vec<T>> {
        let _guard = self.acquire()?;
        let result = self.execute(query).map_err(reported)?;

        result
            .records
            .iter()
            .map(|record| {
                crate::storage::decode::<T>(&record.line)
                    .map_err(|e| e.at(record.position.line, record.position.offset))
                    .map_err(DatabaseError::from)
            })
            .collect::<DatabaseResult<Vec<T>>>()
            .map_err(reported)
    }

    /// Number of results `find` would return (duplicates from `$or` included).
    pub fn count(&self, query: &Query) -> DatabaseResult<usize> {
        let _guard = self.acquire()?;
        Ok(self.execute(query).map_err(reported)?.len())
    }

    /// Tombstones every active line matching the query.
    ///
    /// Returns the number of distinct lines flipped to `D`. When nothing
    /// matches, the file is not touched.
    pub fn delete(&self, query: &Query) -> DatabaseResult<usize> {
        let _guard = self.acquire()?;
        self.tombstone(query).map_err(reported)
    }

    /// Counts lines by marker.
    ///
    /// Bodies are not parsed, so a line with a valid marker and broken JSON
    /// still counts.
    pub fn scan(&self) -> DatabaseResult<ScanReport> {
        let _guard = self.acquire()?;
        self.count_lines().map_err(reported)
    }

    fn acquire(&self) -> DatabaseResult<MutexGuard<'_, ()>> {
        self.lock.lock().map_err(|_| reported(DatabaseError::LockPoisoned))
    }

    fn append(&self, record: &T) -> DatabaseResult<LinePosition> {
        let line = encode(record)?;
        let index = StorageReader::open(self.writer.path())?.line_count();
        let offset = self.writer.append(&line)?;
        let position = LinePosition::new(index, offset);

        log_event_with_fields(
            Event::RecordInserted,
            &[
                ("line", &position.line.to_string()),
                ("byte_offset", &position.offset.to_string()),
            ],
        );

        Ok(position)
    }

    /// Decodes every active line, in file order.
    fn load_active(&self) -> DatabaseResult<Vec<StoredRecord>> {
        let mut reader = StorageReader::open(self.writer.path())?;
        let mut records = Vec::new();

        while let Some(line) = reader.read_next()? {
            if !line.is_active() {
                continue;
            }
            let body: Value = line.decode()?;
            records.push(StoredRecord::new(line.position, line.text, body));
        }

        Ok(records)
    }

    fn execute(&self, query: &Query) -> DatabaseResult<ExecutionResult> {
        let records = self.load_active()?;
        let result = QueryExecutor::new(&self.full_text_fields).execute(&records, query)?;

        log_event_with_fields(
            Event::QueryExecuted,
            &[
                ("kind", query.kind().as_str()),
                ("scanned", &result.scanned_count.to_string()),
                ("returned", &result.returned_count.to_string()),
            ],
        );

        Ok(result)
    }

    fn tombstone(&self, query: &Query) -> DatabaseResult<usize> {
        let result = self.execute(query)?;

        let targets: Vec<MarkerTarget> = result
            .records
            .into_iter()
            .map(|record| MarkerTarget::new(record.position, record.line))
            .collect();

        let flipped = self.writer.rewrite_markers(&targets)?;

        if flipped > 0 {
            log_event_with_fields(
                Event::RecordsTombstoned,
                &[("count", &flipped.to_string())],
            );
        }

        Ok(flipped)
    }

    fn count_lines(&self) -> DatabaseResult<ScanReport> {
        let lines = StorageReader::open(self.writer.path())?.read_all()?;
        let active = lines.iter().filter(|line| line.is_active()).count();

        Ok(ScanReport {
            total: lines.len(),
            active,
            tombstoned: lines.len() - active,
        })
    }
}

/// Logs a failure at the severity its kind calls for and hands it back.
fn reported(err: DatabaseError) -> DatabaseError {
    let event = match &err {
        DatabaseError::Query(_) => Event::QueryRejected,
        e if e.is_fatal() => Event::CorruptRecord,
        _ => Event::StorageFailed,
    };
    log_event_with_fields(
        event,
        &[("code", err.code()), ("message", &err.message())],
    );
    err
}
