//! Result sorting for query execution
//!
//! Multi-key sort: keys are consulted in order and the first key that tells
//! two records apart decides. Records no key can tell apart keep their
//! on-disk order (the sort is stable).

use std::cmp::Ordering;

use serde_json::{Number, Value};

use super::result::StoredRecord;
use crate::query::{SortDirection, SortSpec};

/// Sorts result records
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts records according to the sort keys.
    pub fn sort(records: &mut [StoredRecord], sort_keys: &[SortSpec]) {
        if sort_keys.is_empty() {
            return;
        }
        records.sort_by(|a, b| Self::compare_documents(&a.body, &b.body, sort_keys));
    }

    /// Compares two documents key by key.
    pub fn compare_documents(a: &Value, b: &Value, sort_keys: &[SortSpec]) -> Ordering {
        for key in sort_keys {
            let ordering = Self::compare_values(a.get(&key.field), b.get(&key.field));

            let ordering = match key.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };

            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Compares two JSON values for sorting.
    ///
    /// Ordering rules:
    /// - missing < null < bool < number < string < array < object
    /// - For same types, natural ordering
    fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a_val), Some(b_val)) => {
                let type_order = |v: &Value| -> u8 {
                    match v {
                        Value::Null => 0,
                        Value::Bool(_) => 1,
                        Value::Number(_) => 2,
                        Value::String(_) => 3,
                        Value::Array(_) => 4,
                        Value::Object(_) => 5,
                    }
                };

                let a_type = type_order(a_val);
                let b_type = type_order(b_val);

                if a_type != b_type {
                    return a_type.cmp(&b_type);
                }

                match (a_val, b_val) {
                    (Value::Bool(a_b), Value::Bool(b_b)) => a_b.cmp(b_b),
                    (Value::Number(a_n), Value::Number(b_n)) => compare_numbers(a_n, b_n),
                    (Value::String(a_s), Value::String(b_s)) => a_s.cmp(b_s),
                    _ => Ordering::Equal, // null, arrays and objects are not compared
                }
            }
        }
    }
}

/// Numeric order without losing precision on large integers
pub(crate) fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(ai), Some(bi)) = (a.as_i64(), b.as_i64()) {
        return ai.cmp(&bi);
    }
    if let (Some(au), Some(bu)) = (a.as_u64(), b.as_u64()) {
        return au.cmp(&bu);
    }
    let af = a.as_f64().unwrap_or(0.0);
    let bf = b.as_f64().unwrap_or(0.0);
    af.partial_cmp(&bf).unwrap_or(Ordering::Equal)
}
