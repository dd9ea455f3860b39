//! JSON query language
//!
//! Top-level shapes:
//!
//! ```text
//! {"$text": "token"}                       full-text
//! {"$and": [<field query>, ...]}           intersection
//! {"$or":  [<field query>, ...]}           concatenation
//! {"field": <literal>, "other": {"$gt": 3}} field query
//! ```
//!
//! Field operators: `$eq`, `$gt`, `$lt`, `$in`, exactly one per field.
//!
//! Options: `{"sort": {"age": 1, "name": -1}, "projection": {"name": 1}}`.
//! Sort keys keep the order they were written in.

use serde_json::{Map, Value};

use super::ast::{
    FieldCondition, FieldPredicate, FieldQuery, Projection, Query, QueryOptions, SortSpec,
};
use super::errors::{QueryError, QueryResult};
use crate::storage::json_type_name;

const TEXT: &str = "$text";
const AND: &str = "$and";
const OR: &str = "$or";

impl Query {
    /// Parses a query from its JSON text form.
    pub fn parse(input: &str) -> QueryResult<Self> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| QueryError::unsupported_query(format!("Query is not valid JSON: {}", e)))?;
        Self::from_value(&value)
    }

    /// Classifies a JSON query object.
    ///
    /// `$text` is checked first, then `$and` / `$or`; anything else is a field
    /// query. Mixing top-level operators is rejected.
    pub fn from_value(value: &Value) -> QueryResult<Self> {
        let map = value.as_object().ok_or_else(|| {
            QueryError::unsupported_query(format!(
                "Query must be a JSON object, got {}",
                json_type_name(value)
            ))
        })?;

        if let Some(token) = map.get(TEXT) {
            require_single_key(map, TEXT)?;
            let token = token.as_str().ok_or_else(|| {
                QueryError::unsupported_query(format!(
                    "$text expects a string, got {}",
                    json_type_name(token)
                ))
            })?;
            return Ok(Query::Text(token.to_string()));
        }

        if let Some(branches) = map.get(AND) {
            require_single_key(map, AND)?;
            return Ok(Query::And(parse_branches(AND, branches)?));
        }

        if let Some(branches) = map.get(OR) {
            require_single_key(map, OR)?;
            return Ok(Query::Or(parse_branches(OR, branches)?));
        }

        Ok(Query::Field(FieldQuery::from_map(map)?))
    }
}

impl FieldQuery {
    /// Parses a field query object.
    pub fn from_value(value: &Value) -> QueryResult<Self> {
        let map = value.as_object().ok_or_else(|| {
            QueryError::unsupported_query(format!(
                "Field query must be a JSON object, got {}",
                json_type_name(value)
            ))
        })?;
        Self::from_map(map)
    }

    fn from_map(map: &Map<String, Value>) -> QueryResult<Self> {
        let mut query = FieldQuery::new();

        for (field, spec) in map {
            if field.starts_with('$') {
                return Err(QueryError::unsupported_query(format!(
                    "Unrecognized top-level operator '{}'",
                    field
                )));
            }
            query = query.with_predicate(FieldPredicate {
                field: field.clone(),
                condition: parse_condition(field, spec)?,
            });
        }

        Ok(query)
    }
}

impl QueryOptions {
    /// Parses an options JSON text.
    pub fn parse(input: &str) -> QueryResult<Self> {
        let value: Value = serde_json::from_str(input).map_err(|e| {
            QueryError::unsupported_query(format!("Options are not valid JSON: {}", e))
        })?;
        Self::from_value(&value)
    }

    /// Parses `{"sort": {...}, "projection": {...}}`; both keys optional.
    pub fn from_value(value: &Value) -> QueryResult<Self> {
        let map = value.as_object().ok_or_else(|| {
            QueryError::unsupported_query("Options must be a JSON object")
        })?;

        let mut options = QueryOptions::new();

        for (key, spec) in map {
            match key.as_str() {
                "sort" => options.sort = parse_sort(spec)?,
                "projection" => options.projection = Some(parse_projection(spec)?),
                other => {
                    return Err(QueryError::unsupported_query(format!(
                        "Unknown option '{}'",
                        other
                    )))
                }
            }
        }

        Ok(options)
    }
}

/// Parses a sort object such as `{"age": 1, "name": -1}`.
pub fn parse_sort(value: &Value) -> QueryResult<Vec<SortSpec>> {
    let map = value
        .as_object()
        .ok_or_else(|| QueryError::unsupported_query("sort must be a JSON object"))?;

    map.iter()
        .map(|(field, direction)| match direction.as_i64() {
            Some(1) => Ok(SortSpec::asc(field.as_str())),
            Some(-1) => Ok(SortSpec::desc(field.as_str())),
            _ => Err(QueryError::unsupported_operator(
                field.as_str(),
                format!("Sort direction must be 1 or -1, got {}", direction),
            )),
        })
        .collect()
}

/// Parses a projection object such as `{"name": 1}`.
pub fn parse_projection(value: &Value) -> QueryResult<Projection> {
    let map = value
        .as_object()
        .ok_or_else(|| QueryError::unsupported_query("projection must be a JSON object"))?;

    let mut fields = Vec::with_capacity(map.len());
    for (field, flag) in map {
        let kept = flag.as_i64() == Some(1) || flag.as_bool() == Some(true);
        if !kept {
            return Err(QueryError::unsupported_operator(
                field.as_str(),
                format!("Projection only supports 1 (keep), got {}", flag),
            ));
        }
        fields.push(field.clone());
    }

    Ok(Projection { fields })
}

fn require_single_key(map: &Map<String, Value>, operator: &str) -> QueryResult<()> {
    if map.len() != 1 {
        let others: Vec<&str> = map
            .keys()
            .map(String::as_str)
            .filter(|k| *k != operator)
            .collect();
        return Err(QueryError::unsupported_query(format!(
            "{} cannot be combined with other keys: {}",
            operator,
            others.join(", ")
        )));
    }
    Ok(())
}

fn parse_branches(operator: &str, value: &Value) -> QueryResult<Vec<FieldQuery>> {
    let items = value.as_array().ok_or_else(|| {
        QueryError::unsupported_query(format!(
            "{} expects an array of field queries, got {}",
            operator,
            json_type_name(value)
        ))
    })?;

    items.iter().map(FieldQuery::from_value).collect()
}

/// An object whose keys all start with `$` is an operator set; any other
/// value (objects included) is a literal compared for equality.
fn parse_condition(field: &str, spec: &Value) -> QueryResult<FieldCondition> {
    let ops = match spec.as_object() {
        Some(ops) if !ops.is_empty() && ops.keys().any(|k| k.starts_with('$')) => ops,
        _ => return Ok(FieldCondition::Eq(spec.clone())),
    };

    if ops.keys().any(|k| !k.starts_with('$')) {
        return Err(QueryError::unsupported_operator(
            field,
            "Operators cannot be mixed with literal keys",
        ));
    }

    if ops.len() > 1 {
        let names: Vec<&str> = ops.keys().map(String::as_str).collect();
        return Err(QueryError::unsupported_operator(
            field,
            format!(
                "Exactly one operator per field is supported, got {}",
                names.join(", ")
            ),
        ));
    }

    let (op, operand) = ops
        .iter()
        .next()
        .ok_or_else(|| QueryError::unsupported_operator(field, "Empty operator set"))?;

    match op.as_str() {
        "$eq" => Ok(FieldCondition::Eq(operand.clone())),
        "$gt" => Ok(FieldCondition::Gt(orderable_bound(field, op, operand)?)),
        "$lt" => Ok(FieldCondition::Lt(orderable_bound(field, op, operand)?)),
        "$in" => match operand {
            Value::Array(values) => Ok(FieldCondition::In(values.clone())),
            other => Err(QueryError::unsupported_operator(
                field,
                format!("$in expects an array, got {}", json_type_name(other)),
            )),
        },
        other => Err(QueryError::unsupported_operator(
            field,
            format!("Unknown field operator '{}'", other),
        )),
    }
}

fn orderable_bound(field: &str, op: &str, operand: &Value) -> QueryResult<Value> {
    match operand {
        Value::Number(_) | Value::String(_) => Ok(operand.clone()),
        other => Err(QueryError::unsupported_comparison(
            field,
            format!(
                "{} needs a number or string bound, got {}",
                op,
                json_type_name(other)
            ),
        )),
    }
}
