//! Observability for flatdb
//!
//! Structured JSON logging of typed lifecycle events. Observability is
//! read-only: it never changes the outcome of an operation.
//!
//! ```ignore
//! use flatdb::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::QueryExecuted, &[("returned", "42")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
