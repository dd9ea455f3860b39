//! Log storage subsystem for flatdb
//!
//! The store is a single append-only text file holding one record per line.
//!
//! # Design Principles
//!
//! - Append-only (lines are never removed or reordered)
//! - Deletion flips the `E` marker to `D`; tombstones stay on disk forever
//! - Every line read back carries its position, so callers never locate a
//!   record by re-encoding it
//! - The file is opened fresh for each operation

mod errors;
mod reader;
mod record;
mod writer;

pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use reader::StorageReader;
pub use record::{decode, encode, LinePosition, LogLine, Marker};
pub(crate) use record::json_type_name;
pub use writer::{MarkerTarget, StorageWriter};
