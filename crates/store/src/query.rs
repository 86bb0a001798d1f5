//! Declarative select queries.
//!
//! A [`Query`] is data: filters, an optional sort column and an optional
//! limit. Each backend interprets it (URL parameters for PostgREST,
//! in-process evaluation for the memory store).

use serde_json::Value;
use std::cmp::Ordering;

use crate::row::Row;

// =============================================================================
// Filter
// =============================================================================

/// A row predicate on a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column = value`
    Eq(String, Value),
    /// `column IN (values...)`
    In(String, Vec<Value>),
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(column.into(), value.into())
    }

    pub fn is_in<V: Into<Value>>(column: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Filter::In(column.into(), values.into_iter().map(Into::into).collect())
    }

    /// Column the filter applies to.
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(column, _) | Filter::In(column, _) => column,
        }
    }

    /// Evaluate against a row. Missing columns never match.
    pub fn matches(&self, row: &Row) -> bool {
        let Some(actual) = row.get(self.column()) else {
            return false;
        };
        match self {
            Filter::Eq(_, expected) => values_equal(actual, expected),
            Filter::In(_, expected) => expected.iter().any(|v| values_equal(actual, v)),
        }
    }

    /// PostgREST query parameter, e.g. `("etype", "in.(MACRO,MICRO)")`.
    pub fn to_param(&self) -> (String, String) {
        match self {
            Filter::Eq(column, Value::Null) => (column.clone(), "is.null".to_string()),
            Filter::Eq(column, value) => (column.clone(), format!("eq.{}", scalar_text(value))),
            Filter::In(column, values) => {
                let items: Vec<String> = values.iter().map(list_item_text).collect();
                (column.clone(), format!("in.({})", items.join(",")))
            }
        }
    }
}

// =============================================================================
// Order / Query
// =============================================================================

/// Sort order for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

impl Order {
    pub fn to_param(&self) -> String {
        let dir = if self.descending { "desc" } else { "asc" };
        format!("{}.{}", self.column, dir)
    }
}

/// A select query against one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
    /// Columns to return (`None` = all).
    pub columns: Option<Vec<String>>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Filter::eq(column, value))
    }

    pub fn is_in<V: Into<Value>>(
        self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.filter(Filter::is_in(column, values))
    }

    pub fn order_by(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            descending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Apply a limit only when one is given.
    pub fn maybe_limit(mut self, limit: Option<usize>) -> Self {
        if limit.is_some() {
            self.limit = limit;
        }
        self
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    /// The `select=` parameter value.
    pub fn select_param(&self) -> String {
        match &self.columns {
            Some(columns) if !columns.is_empty() => columns.join(","),
            _ => "*".to_string(),
        }
    }
}

// =============================================================================
// Value helpers
// =============================================================================

/// Loose equality: numbers compare numerically, numeric strings compare
/// equal to the number they spell.
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) if a.is_number() || b.is_number() => x == y,
        _ => a == b,
    }
}

/// Total order used for sorting: null < bool < number < string < other.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            _ => 4,
        }
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(_), Value::Number(_)) => {
            let x = a.as_f64().unwrap_or(0.0);
            let y = b.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn list_item_text(value: &Value) -> String {
    match value {
        Value::String(s) if s.contains([',', '(', ')', '"', ' ']) => {
            format!("\"{}\"", s.replace('"', "\\\""))
        }
        other => scalar_text(other),
    }
}
