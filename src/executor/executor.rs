//! Query executor for flatdb
//!
//! Executes classified queries against the active records of a log.
//!
//! Execution flow (strict order):
//! 1. Dispatch on the query kind
//! 2. Filter records, preserving on-disk order
//! 3. Combine branch results for `$and` / `$or`
//! 4. Apply sort (if requested)
//! 5. Apply projection (if requested)

use std::collections::HashSet;

use serde_json::Value;

use crate::query::{FieldQuery, Query, QueryOptions, QueryResult};
use crate::storage::LinePosition;

use super::filters::PredicateFilter;
use super::projection::Projector;
use super::result::{ExecutionResult, StoredRecord};
use super::sorter::ResultSorter;
use super::text::TextMatcher;

/// Query executor bound to a store's full-text field list
pub struct QueryExecutor<'a> {
    full_text_fields: &'a [String],
}

impl<'a> QueryExecutor<'a> {
    /// Creates a new executor
    pub fn new(full_text_fields: &'a [String]) -> Self {
        Self { full_text_fields }
    }

    /// Executes a query over active records.
    ///
    /// Any error aborts the whole query; no partial result is returned.
    pub fn execute(&self, records: &[StoredRecord], query: &Query) -> QueryResult<ExecutionResult> {
        let matched = match query {
            Query::Field(field_query) => Self::filter(records, field_query)?,
            Query::And(branches) => Self::intersect(records, branches)?,
            Query::Or(branches) => Self::concat(records, branches)?,
            Query::Text(text) => self.text_search(records, text)?,
        };

        Ok(ExecutionResult::new(matched, records.len()))
    }

    /// Applies sort then projection and returns the output documents.
    pub fn shape(mut records: Vec<StoredRecord>, options: Option<&QueryOptions>) -> Vec<Value> {
        let Some(options) = options else {
            return records.into_iter().map(|r| r.body).collect();
        };

        ResultSorter::sort(&mut records, &options.sort);

        match &options.projection {
            Some(projection) => records
                .iter()
                .map(|r| Projector::apply(&r.body, projection))
                .collect(),
            None => records.into_iter().map(|r| r.body).collect(),
        }
    }

    /// Stable filter by a field query
    fn filter(records: &[StoredRecord], query: &FieldQuery) -> QueryResult<Vec<StoredRecord>> {
        let mut matched = Vec::new();
        for record in records {
            if PredicateFilter::matches(&record.body, query)? {
                matched.push(record.clone());
            }
        }
        Ok(matched)
    }

    /// Records present in every branch, by line identity, in first-branch order.
    fn intersect(
        records: &[StoredRecord],
        branches: &[FieldQuery],
    ) -> QueryResult<Vec<StoredRecord>> {
        let mut results = branches
            .iter()
            .map(|branch| Self::filter(records, branch))
            .collect::<QueryResult<Vec<_>>>()?;

        if results.is_empty() {
            return Ok(Vec::new());
        }

        let first = results.remove(0);
        let others: Vec<HashSet<LinePosition>> = results
            .iter()
            .map(|branch| branch.iter().map(|r| r.position).collect())
            .collect();

        Ok(first
            .into_iter()
            .filter(|r| others.iter().all(|set| set.contains(&r.position)))
            .collect())
    }

    /// Branch results concatenated in branch order, duplicates kept.
    fn concat(records: &[StoredRecord], branches: &[FieldQuery]) -> QueryResult<Vec<StoredRecord>> {
        let mut matched = Vec::new();
        for branch in branches {
            matched.extend(Self::filter(records, branch)?);
        }
        Ok(matched)
    }

    fn text_search(&self, records: &[StoredRecord], text: &str) -> QueryResult<Vec<StoredRecord>> {
        let matcher = TextMatcher::new(self.full_text_fields, text);
        let mut matched = Vec::new();
        for record in records {
            if matcher.matches(&record.body)? {
                matched.push(record.clone());
            }
        }
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Projection, QueryErrorCode, SortSpec};
    use serde_json::json;

    fn store(bodies: Vec<Value>) -> Vec<StoredRecord> {
        bodies
            .into_iter()
            .enumerate()
            .map(|(i, body)| {
                let line = format!("E{}", body);
                StoredRecord::new(LinePosition::new(i, (i * 100) as u64), line, body)
            })
            .collect()
    }

    fn bodies(result: &ExecutionResult) -> Vec<Value> {
        result.records.iter().map(|r| r.body.clone()).collect()
    }

    fn abc_store() -> Vec<StoredRecord> {
        store(vec![
            json!({"a": 1, "b": 1}),
            json!({"a": 1, "b": 2}),
            json!({"a": 2, "b": 1}),
        ])
    }

    #[test]
    fn test_field_query_preserves_order() {
        let records = store(vec![json!({"age": 5}), json!({"age": 10}), json!({"age": 15})]);
        let executor = QueryExecutor::new(&[]);

        let query = Query::field(FieldQuery::new().filter_gt("age", json!(7)));
        let result = executor.execute(&records, &query).unwrap();

        assert_eq!(bodies(&result), vec![json!({"age": 10}), json!({"age": 15})]);
        assert_eq!(result.scanned_count, 3);
        assert_eq!(result.returned_count, 2);
    }

    #[test]
    fn test_and_intersects() {
        let records = abc_store();
        let executor = QueryExecutor::new(&[]);

        let query = Query::and(vec![
            FieldQuery::new().filter_eq("a", json!(1)),
            FieldQuery::new().filter_eq("b", json!(1)),
        ]);
        let result = executor.execute(&records, &query).unwrap();

        assert_eq!(bodies(&result), vec![json!({"a": 1, "b": 1})]);
    }

    #[test]
    fn test_and_keeps_identical_records_on_distinct_lines() {
        let records = store(vec![json!({"a": 1}), json!({"a": 1})]);
        let executor = QueryExecutor::new(&[]);

        let query = Query::and(vec![
            FieldQuery::new().filter_eq("a", json!(1)),
            FieldQuery::new(),
        ]);
        let result = executor.execute(&records, &query).unwrap();

        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_or_concatenates_without_dedup() {
        let records = abc_store();
        let executor = QueryExecutor::new(&[]);

        let query = Query::or(vec![
            FieldQuery::new().filter_eq("a", json!(1)),
            FieldQuery::new().filter_eq("b", json!(1)),
        ]);
        let result = executor.execute(&records, &query).unwrap();

        assert_eq!(
            bodies(&result),
            vec![
                json!({"a": 1, "b": 1}),
                json!({"a": 1, "b": 2}),
                json!({"a": 1, "b": 1}),
                json!({"a": 2, "b": 1}),
            ]
        );
    }

    #[test]
    fn test_empty_branch_lists() {
        let records = abc_store();
        let executor = QueryExecutor::new(&[]);

        assert!(executor.execute(&records, &Query::and(vec![])).unwrap().is_empty());
        assert!(executor.execute(&records, &Query::or(vec![])).unwrap().is_empty());
    }

    #[test]
    fn test_text_query() {
        let fields = vec!["title".to_string()];
        let records = store(vec![json!({"title": "Blue Sky"}), json!({"title": "Red Sea"})]);
        let executor = QueryExecutor::new(&fields);

        let result = executor.execute(&records, &Query::text("blue")).unwrap();
        assert_eq!(bodies(&result), vec![json!({"title": "Blue Sky"})]);

        let result = executor.execute(&records, &Query::text("Blue Sky")).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_error_aborts_whole_query() {
        let records = store(vec![json!({"age": 1}), json!({"age": "x"})]);
        let executor = QueryExecutor::new(&[]);

        let query = Query::field(FieldQuery::new().filter_gt("age", json!(0)));
        let err = executor.execute(&records, &query).unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::FlatUnsupportedComparison);
    }

    #[test]
    fn test_shape_sorts_before_projecting() {
        let records = store(vec![
            json!({"name": "b", "age": 2}),
            json!({"name": "a", "age": 1}),
        ]);
        let options = QueryOptions::new()
            .with_sort(SortSpec::asc("age"))
            .with_projection(Projection::new(["name"]));

        let shaped = QueryExecutor::shape(records, Some(&options));
        assert_eq!(shaped, vec![json!({"name": "a"}), json!({"name": "b"})]);
    }

    #[test]
    fn test_shape_without_options() {
        let records = store(vec![json!({"x": 2}), json!({"x": 1})]);
        let shaped = QueryExecutor::shape(records, None);
        assert_eq!(shaped, vec![json!({"x": 2}), json!({"x": 1})]);
    }
}
