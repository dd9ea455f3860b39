//! Query AST structures
//!
//! A query is classified exactly once, when it is built or parsed; the
//! executor dispatches on the variant and never probes for keys again.

use std::fmt;

use serde_json::Value;

/// Per-field condition
#[derive(Debug, Clone, PartialEq)]
pub enum FieldCondition {
    /// Equality: field = value (also the meaning of a bare literal)
    Eq(Value),
    /// Greater than: field > value
    Gt(Value),
    /// Less than: field < value
    Lt(Value),
    /// Membership: field is one of the values
    In(Vec<Value>),
}

impl FieldCondition {
    /// Returns the operator name for logs and errors
    pub fn op_name(&self) -> &'static str {
        match self {
            FieldCondition::Eq(_) => "$eq",
            FieldCondition::Gt(_) => "$gt",
            FieldCondition::Lt(_) => "$lt",
            FieldCondition::In(_) => "$in",
        }
    }
}

/// A single predicate (field + condition)
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPredicate {
    /// Field name
    pub field: String,
    /// Condition on the field's value
    pub condition: FieldCondition,
}

impl FieldPredicate {
    /// Create an equality predicate
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            condition: FieldCondition::Eq(value),
        }
    }

    /// Create a greater-than predicate
    pub fn gt(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            condition: FieldCondition::Gt(value),
        }
    }

    /// Create a less-than predicate
    pub fn lt(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            condition: FieldCondition::Lt(value),
        }
    }

    /// Create a membership predicate
    pub fn in_list(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            condition: FieldCondition::In(values),
        }
    }
}

/// Field query: predicates implicitly ANDed, in the order given.
///
/// An empty field query matches every active record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldQuery {
    pub predicates: Vec<FieldPredicate>,
}

impl FieldQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate
    pub fn with_predicate(mut self, predicate: FieldPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Adds an equality filter
    pub fn filter_eq(self, field: impl Into<String>, value: Value) -> Self {
        self.with_predicate(FieldPredicate::eq(field, value))
    }

    /// Adds a greater-than filter
    pub fn filter_gt(self, field: impl Into<String>, value: Value) -> Self {
        self.with_predicate(FieldPredicate::gt(field, value))
    }

    /// Adds a less-than filter
    pub fn filter_lt(self, field: impl Into<String>, value: Value) -> Self {
        self.with_predicate(FieldPredicate::lt(field, value))
    }

    /// Adds a membership filter
    pub fn filter_in(self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.with_predicate(FieldPredicate::in_list(field, values))
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

/// Query kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Field,
    And,
    Or,
    Text,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Field => "field",
            QueryKind::And => "and",
            QueryKind::Or => "or",
            QueryKind::Text => "text",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified query
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Per-field conditions
    Field(FieldQuery),
    /// Intersection of independently evaluated field queries
    And(Vec<FieldQuery>),
    /// Concatenation of independently evaluated field queries
    Or(Vec<FieldQuery>),
    /// Whole-token match over the store's full-text fields
    Text(String),
}

impl Query {
    /// Query matching every active record
    pub fn all() -> Self {
        Query::Field(FieldQuery::new())
    }

    pub fn field(query: FieldQuery) -> Self {
        Query::Field(query)
    }

    pub fn and(branches: Vec<FieldQuery>) -> Self {
        Query::And(branches)
    }

    pub fn or(branches: Vec<FieldQuery>) -> Self {
        Query::Or(branches)
    }

    pub fn text(token: impl Into<String>) -> Self {
        Query::Text(token.into())
    }

    pub fn kind(&self) -> QueryKind {
        match self {
            Query::Field(_) => QueryKind::Field,
            Query::And(_) => QueryKind::And,
            Query::Or(_) => QueryKind::Or,
            Query::Text(_) => QueryKind::Text,
        }
    }
}

impl From<FieldQuery> for Query {
    fn from(query: FieldQuery) -> Self {
        Query::Field(query)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Field to sort by
    pub field: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Fields retained in the output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    pub fields: Vec<String>,
}

impl Projection {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}

/// Post-processing options for `find`.
///
/// Sort keys are consulted in order; the first key that tells two records
/// apart decides. Sort runs before projection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub sort: Vec<SortSpec>,
    pub projection: Option<Projection>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sort key
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort.push(sort);
        self
    }

    /// Sets the projection
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sort.is_empty() && self.projection.is_none()
    }
}
