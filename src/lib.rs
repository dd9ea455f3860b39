//! flatdb - a minimal embedded document store
//!
//! Records of one type live in a single append-only JSON-lines file. Each
//! line is a status marker (`E` active, `D` deleted) followed by the record
//! as a compact JSON object. Deleting flips the marker; lines are never
//! removed or reordered.
//!
//! ```ignore
//! use flatdb::{Database, Query};
//!
//! let db: Database<Book> = Database::open_path("books.db", vec!["title".into()])?;
//! db.insert(&book)?;
//! let blue = db.find(&Query::text("blue"), None)?;
//! ```

pub mod cli;
pub mod database;
pub mod executor;
pub mod observability;
pub mod query;
pub mod storage;

pub use database::{Database, DatabaseConfig, DatabaseError, DatabaseResult, ScanReport};
pub use query::{FieldQuery, Projection, Query, QueryOptions, SortSpec};
pub use storage::LinePosition;
