//! Field projection

use serde_json::{Map, Value};

use crate::query::Projection;

/// Reduces documents to a subset of their fields
pub struct Projector;

impl Projector {
    /// Keeps only the projected fields that the document actually has.
    ///
    /// Absent fields stay absent; kept fields retain the document's own order.
    pub fn apply(document: &Value, projection: &Projection) -> Value {
        match document {
            Value::Object(fields) => Value::Object(
                fields
                    .iter()
                    .filter(|(name, _)| projection.contains(name))
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect::<Map<String, Value>>(),
            ),
            other => other.clone(),
        }
    }
}
