//! Query Semantics Tests
//!
//! Tests for query behavior through the public store handle:
//! - `$and` intersects, `$or` concatenates without dedup
//! - Ordering operators keep on-disk order
//! - Sort runs before projection
//! - `$text` matches one whole token, case-insensitively
//! - Unsupported shapes and comparisons are rejected, never guessed

use flatdb::query::QueryErrorCode;
use flatdb::{Database, DatabaseError, FieldQuery, Projection, Query, QueryOptions, SortSpec};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn open_store(temp_dir: &TempDir, records: &[Value]) -> Database<Value> {
    let db = Database::open_path(temp_dir.path().join("store.db"), vec!["title".to_string()])
        .unwrap();
    for record in records {
        db.insert(record).unwrap();
    }
    db
}

fn find(db: &Database<Value>, query: &str) -> Vec<Value> {
    db.find(&Query::parse(query).unwrap(), None).unwrap()
}

fn rejection(db: &Database<Value>, query: &str) -> QueryErrorCode {
    let query = match Query::parse(query) {
        Ok(query) => query,
        Err(e) => return e.code(),
    };
    match db.find(&query, None) {
        Err(DatabaseError::Query(e)) => e.code(),
        other => panic!("expected query rejection, got {:?}", other),
    }
}

fn abc_records() -> Vec<Value> {
    vec![
        json!({"a": 1, "b": 1}),
        json!({"a": 1, "b": 2}),
        json!({"a": 2, "b": 1}),
    ]
}

// =============================================================================
// Boolean combinators
// =============================================================================

#[test]
fn test_and_returns_intersection() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_store(&temp_dir, &abc_records());

    assert_eq!(
        find(&db, r#"{"$and":[{"a":1},{"b":1}]}"#),
        vec![json!({"a": 1, "b": 1})]
    );
}

#[test]
fn test_or_returns_branch_matches_with_duplicates() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_store(&temp_dir, &abc_records());

    // {a:1,b:1} satisfies both branches and appears once per branch
    assert_eq!(
        find(&db, r#"{"$or":[{"a":1},{"b":1}]}"#),
        vec![
            json!({"a": 1, "b": 1}),
            json!({"a": 1, "b": 2}),
            json!({"a": 1, "b": 1}),
            json!({"a": 2, "b": 1}),
        ]
    );
}

#[test]
fn test_and_keeps_identical_records_from_distinct_lines() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_store(&temp_dir, &[json!({"a": 1}), json!({"a": 1})]);

    assert_eq!(find(&db, r#"{"$and":[{"a":1},{}]}"#).len(), 2);
    assert_eq!(find(&db, r#"{"$or":[{"a":1}]}"#).len(), 2);
}

#[test]
fn test_empty_branch_lists_match_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_store(&temp_dir, &abc_records());

    assert!(find(&db, r#"{"$and":[]}"#).is_empty());
    assert!(find(&db, r#"{"$or":[]}"#).is_empty());
}

#[test]
fn test_empty_field_query_matches_everything() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_store(&temp_dir, &abc_records());

    assert_eq!(find(&db, "{}"), abc_records());
}

// =============================================================================
// Field operators
// =============================================================================

#[test]
fn test_gt_keeps_on_disk_order() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_store(
        &temp_dir,
        &[json!({"age": 15}), json!({"age": 5}), json!({"age": 10})],
    );

    assert_eq!(
        find(&db, r#"{"age":{"$gt":7}}"#),
        vec![json!({"age": 15}), json!({"age": 10})]
    );
}

#[test]
fn test_lt_eq_and_in() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_store(
        &temp_dir,
        &[
            json!({"age": 5, "c": "red"}),
            json!({"age": 10, "c": "blue"}),
            json!({"age": 15, "c": "green"}),
        ],
    );

    assert_eq!(find(&db, r#"{"age":{"$lt":10}}"#).len(), 1);
    assert_eq!(find(&db, r#"{"age":{"$eq":10}}"#), vec![json!({"age": 10, "c": "blue"})]);
    assert_eq!(find(&db, r#"{"c":{"$in":["red","green"]}}"#).len(), 2);
    assert_eq!(find(&db, r#"{"age":{"$gt":4},"c":"green"}"#).len(), 1);
}

#[test]
fn test_missing_field_never_matches() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_store(&temp_dir, &[json!({"name": "x"}), json!({"age": 3})]);

    assert_eq!(find(&db, r#"{"age":{"$gt":1}}"#), vec![json!({"age": 3})]);
    assert_eq!(find(&db, r#"{"age":null}"#).len(), 0);
}

#[test]
fn test_equality_has_no_coercion() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_store(&temp_dir, &[json!({"v": 1}), json!({"v": "1"}), json!({"v": true})]);

    assert_eq!(find(&db, r#"{"v":1}"#), vec![json!({"v": 1})]);
    assert_eq!(find(&db, r#"{"v":"1"}"#), vec![json!({"v": "1"})]);
}

#[test]
fn test_float_field_equals_integer_literal() {
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        name: String,
        price: f64,
    }

    let temp_dir = TempDir::new().unwrap();
    let db: Database<Item> = Database::open_path(temp_dir.path().join("items.db"), vec![]).unwrap();
    let item = Item {
        name: "a".to_string(),
        price: 10.0,
    };
    db.insert(&item).unwrap();

    let count = |query: &str| db.count(&Query::parse(query).unwrap()).unwrap();

    assert_eq!(count(r#"{"price":10}"#), 1);
    assert_eq!(count(r#"{"price":{"$eq":10}}"#), 1);
    assert_eq!(count(r#"{"price":{"$in":[10]}}"#), 1);
    assert_eq!(count(r#"{"price":{"$gt":10}}"#), 0);
    assert_eq!(count(r#"{"price":{"$lt":10}}"#), 0);
    assert_eq!(count(r#"{"price":{"$in":[10.5, 11]}}"#), 0);

    assert_eq!(
        db.find_records(&Query::parse(r#"{"price":10}"#).unwrap()).unwrap(),
        vec![item]
    );
}

#[test]
fn test_object_literal_is_equality() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_store(&temp_dir, &[json!({"m": {"k": 1}}), json!({"m": {"k": 2}})]);

    assert_eq!(find(&db, r#"{"m":{"k":1}}"#), vec![json!({"m": {"k": 1}})]);
}

// =============================================================================
// Sort and projection
// =============================================================================

#[test]
fn test_sort_then_project() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_store(
        &temp_dir,
        &[json!({"name": "b", "age": 2}), json!({"name": "a", "age": 1})],
    );

    let options = QueryOptions::parse(r#"{"sort":{"age":1},"projection":{"name":1}}"#).unwrap();
    let found = db.find(&Query::all(), Some(&options)).unwrap();

    assert_eq!(found, vec![json!({"name": "a"}), json!({"name": "b"})]);
}

#[test]
fn test_sort_by_projected_away_field() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_store(
        &temp_dir,
        &[
            json!({"name": "x", "rank": 3}),
            json!({"name": "y", "rank": 1}),
            json!({"name": "z", "rank": 2}),
        ],
    );

    let options = QueryOptions::new()
        .with_sort(SortSpec::desc("rank"))
        .with_projection(Projection::new(["name"]));
    let found = db.find(&Query::all(), Some(&options)).unwrap();

    assert_eq!(
        found,
        vec![json!({"name": "x"}), json!({"name": "z"}), json!({"name": "y"})]
    );
}

#[test]
fn test_multi_key_sort_and_stable_ties() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_store(
        &temp_dir,
        &[
            json!({"id": 0, "team": "b", "score": 1}),
            json!({"id": 1, "team": "a", "score": 5}),
            json!({"id": 2, "team": "a", "score": 5}),
            json!({"id": 3, "team": "a", "score": 9}),
        ],
    );

    let options = QueryOptions::parse(r#"{"sort":{"team":1,"score":-1},"projection":{"id":1}}"#)
        .unwrap();
    let found = db.find(&Query::all(), Some(&options)).unwrap();

    assert_eq!(
        found,
        vec![json!({"id": 3}), json!({"id": 1}), json!({"id": 2}), json!({"id": 0})]
    );
}

#[test]
fn test_projection_of_missing_field_is_absent() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_store(&temp_dir, &[json!({"a": 1, "b": 2}), json!({"b": 3})]);

    let options = QueryOptions::new().with_projection(Projection::new(["a"]));
    let found = db.find(&Query::all(), Some(&options)).unwrap();

    assert_eq!(found, vec![json!({"a": 1}), json!({})]);
}

// =============================================================================
// Full-text
// =============================================================================

#[test]
fn test_text_matches_single_token_case_insensitively() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_store(
        &temp_dir,
        &[json!({"title": "Blue Sky"}), json!({"title": "Red Sea"})],
    );

    assert_eq!(find(&db, r#"{"$text":"blue"}"#), vec![json!({"title": "Blue Sky"})]);
    assert_eq!(find(&db, r#"{"$text":"SKY"}"#).len(), 1);
}

#[test]
fn test_text_multi_word_query_is_one_token() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_store(&temp_dir, &[json!({"title": "Blue Sky"})]);

    assert!(find(&db, r#"{"$text":"Blue Sky"}"#).is_empty());
}

#[test]
fn test_text_ignores_unconfigured_and_missing_fields() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_store(
        &temp_dir,
        &[json!({"body": "blue"}), json!({"title": "Blue"})],
    );

    assert_eq!(find(&db, r#"{"$text":"blue"}"#), vec![json!({"title": "Blue"})]);
}

#[test]
fn test_text_on_non_string_field_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_store(&temp_dir, &[json!({"title": 42})]);

    assert_eq!(
        rejection(&db, r#"{"$text":"42"}"#),
        QueryErrorCode::FlatUnsupportedFieldType
    );
}

// =============================================================================
// Rejections
// =============================================================================

#[test]
fn test_unsupported_shapes_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_store(&temp_dir, &abc_records());

    for query in [
        r#"{"$nor":[{"a":1}]}"#,
        r#"{"a":{"$regex":"x"}}"#,
        r#"{"a":{"$gt":1,"$lt":3}}"#,
        r#"{"$and":{"a":1}}"#,
        r#"{"$text":"x","a":1}"#,
        r#"[1]"#,
    ] {
        assert_eq!(
            rejection(&db, query),
            QueryErrorCode::FlatUnsupportedQuery,
            "query {} should be rejected",
            query
        );
    }
}

#[test]
fn test_ordering_across_types_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let db = open_store(&temp_dir, &[json!({"age": 3}), json!({"age": "three"})]);

    assert_eq!(
        rejection(&db, r#"{"age":{"$gt":1}}"#),
        QueryErrorCode::FlatUnsupportedComparison
    );
    assert_eq!(
        rejection(&db, r#"{"age":{"$lt":[1]}}"#),
        QueryErrorCode::FlatUnsupportedComparison
    );
}

#[test]
fn test_builder_and_parser_agree() {
    let built = Query::and(vec![
        FieldQuery::new().filter_eq("a", json!(1)),
        FieldQuery::new().filter_gt("b", json!(0)),
    ]);
    let parsed = Query::parse(r#"{"$and":[{"a":1},{"b":{"$gt":0}}]}"#).unwrap();

    assert_eq!(built, parsed);
}
