//! Query model for flatdb
//!
//! Defines the classified query representation consumed by the executor and
//! the JSON query language that produces it.
//!
//! # Shapes
//!
//! - Field query: per-field literal or operator, implicitly ANDed
//! - `$and` / `$or` over a list of field queries
//! - `$text`: whole-token match over the store's full-text fields

mod ast;
mod errors;
mod parser;

pub use ast::{
    FieldCondition, FieldPredicate, FieldQuery, Projection, Query, QueryKind, QueryOptions,
    SortDirection, SortSpec,
};
pub use errors::{QueryError, QueryErrorCode, QueryResult, Severity};
pub use parser::{parse_projection, parse_sort};
