//! Full-text matching
//!
//! Not an index: every query re-tokenizes the configured fields of every
//! candidate record. The query string is lower-cased and matched as one
//! token; it is never split into several search terms, so a query holding
//! whitespace can never match.

use serde_json::Value;

use crate::query::{QueryError, QueryResult};
use crate::storage::json_type_name;

/// Whole-token matcher over a fixed list of string fields
pub struct TextMatcher<'a> {
    fields: &'a [String],
    token: String,
}

impl<'a> TextMatcher<'a> {
    /// Creates a matcher for `query` over `fields`, in field order
    pub fn new(fields: &'a [String], query: &str) -> Self {
        Self {
            fields,
            token: query.to_lowercase(),
        }
    }

    /// Checks whether any configured field contains the token.
    ///
    /// Fields are scanned in configuration order and scanning stops at the
    /// first hit. A missing field contributes no tokens; a present field that
    /// is not a string is rejected.
    pub fn matches(&self, document: &Value) -> QueryResult<bool> {
        for field in self.fields {
            match document.get(field) {
                None => continue,
                Some(Value::String(text)) => {
                    if text
                        .to_lowercase()
                        .split_whitespace()
                        .any(|t| t == self.token)
                    {
                        return Ok(true);
                    }
                }
                Some(other) => {
                    return Err(QueryError::unsupported_field_type(
                        field.as_str(),
                        json_type_name(other),
                    ))
                }
            }
        }
        Ok(false)
    }
}
