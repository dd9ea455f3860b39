//! Query executor subsystem for flatdb
//!
//! Consumes classified queries and produces deterministic results over the
//! active records of a log.
//!
//! # Execution Flow (strict order)
//!
//! 1. Filter active records according to the query kind
//! 2. Combine branch results (`$and` intersects, `$or` concatenates)
//! 3. Apply sort (if specified)
//! 4. Apply projection (if specified)
//!
//! Filtering never reorders records; only an explicit sort does.

mod executor;
mod filters;
mod projection;
mod result;
mod sorter;
mod text;

pub use executor::QueryExecutor;
pub use filters::PredicateFilter;
pub use projection::Projector;
pub use result::{ExecutionResult, StoredRecord};
pub use sorter::ResultSorter;
pub use text::TextMatcher;
