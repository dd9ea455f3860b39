//! Predicate filtering for query execution
//!
//! No type coercion. Equality is JSON equality with numbers compared by
//! value (`10` equals `10.0`), so a type mismatch simply fails to match.
//! Ordering is only defined for number/number and string/string; anything
//! else is rejected rather than guessed.

use std::cmp::Ordering;

use serde_json::Value;

use super::sorter::compare_numbers;
use crate::query::{FieldCondition, FieldPredicate, FieldQuery, QueryError, QueryResult};
use crate::storage::json_type_name;

/// Evaluates field queries against documents
pub struct PredicateFilter;

impl PredicateFilter {
    /// Checks if a document matches every predicate of a field query.
    ///
    /// Predicates are evaluated in order and evaluation stops at the first
    /// one that fails.
    pub fn matches(document: &Value, query: &FieldQuery) -> QueryResult<bool> {
        for predicate in &query.predicates {
            if !Self::matches_predicate(document, predicate)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Checks if a document matches a single predicate
    pub fn matches_predicate(document: &Value, predicate: &FieldPredicate) -> QueryResult<bool> {
        // Missing field = no match, for every operator
        let actual = match document.get(&predicate.field) {
            Some(v) => v,
            None => return Ok(false),
        };

        match &predicate.condition {
            FieldCondition::Eq(expected) => Ok(values_equal(actual, expected)),
            FieldCondition::Gt(bound) => {
                Ok(Self::order(&predicate.field, "$gt", actual, bound)? == Ordering::Greater)
            }
            FieldCondition::Lt(bound) => {
                Ok(Self::order(&predicate.field, "$lt", actual, bound)? == Ordering::Less)
            }
            FieldCondition::In(values) => Ok(values.iter().any(|v| values_equal(actual, v))),
        }
    }

    /// Natural order of `actual` relative to `bound`
    fn order(field: &str, op: &str, actual: &Value, bound: &Value) -> QueryResult<Ordering> {
        match (actual, bound) {
            (Value::Number(a), Value::Number(b)) => Ok(compare_numbers(a, b)),
            (Value::String(a), Value::String(b)) => Ok(a.as_str().cmp(b.as_str())),
            _ => Err(QueryError::unsupported_comparison(
                field,
                format!(
                    "{} cannot order a {} field against a {} bound",
                    op,
                    json_type_name(actual),
                    json_type_name(bound)
                ),
            )),
        }
    }
}

/// JSON equality agreeing with the numeric order used by `$gt` / `$lt`
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y) == Ordering::Equal,
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).map_or(false, |y| values_equal(x, y)))
        }
        _ => a == b,
    }
}
