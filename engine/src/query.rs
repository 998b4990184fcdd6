//! Store-agnostic query description.
//!
//! A [`Query`] is plain data: a record store adapter translates it into its
//! own query language, and [`Query::matches`] gives the reference semantics
//! used by the in-memory store.

use crate::{error::Result, CollectionName, Error, Sortable};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::str::FromStr;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// The opposite direction.
    pub fn reverse(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            _ => Err(Error::InvalidInput(format!("unknown sort direction: {s}"))),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Asc => write!(f, "asc"),
            Direction::Desc => write!(f, "desc"),
        }
    }
}

/// Comparison applied by a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Lt,
}

/// A single `column <cmp> value` filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub column: String,
    pub comparison: Comparison,
    pub value: Value,
}

impl Condition {
    /// Evaluate against a record. A missing attribute reads as `Null`.
    pub fn matches<R: Sortable>(&self, record: &R) -> bool {
        let actual = record.attribute(&self.column).unwrap_or(Value::Null);
        let ordering = compare_values(&actual, &self.value);
        match self.comparison {
            Comparison::Eq => ordering == Ordering::Equal,
            Comparison::Ne => ordering != Ordering::Equal,
            Comparison::Gt => ordering == Ordering::Greater,
            Comparison::Lt => ordering == Ordering::Less,
        }
    }
}

/// Description of a read or bulk write over one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub collection: CollectionName,
    pub conditions: Vec<Condition>,
    pub order_by: Vec<(String, Direction)>,
    pub limit: Option<usize>,
    /// Soft-deleted records are visible to this query
    pub with_trashed: bool,
}

impl Query {
    /// Query every live record of a collection.
    pub fn new(collection: impl Into<CollectionName>) -> Self {
        Self {
            collection: collection.into(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            with_trashed: false,
        }
    }

    fn filter(mut self, column: &str, comparison: Comparison, value: Value) -> Self {
        self.conditions.push(Condition {
            column: column.to_string(),
            comparison,
            value,
        });
        self
    }

    pub fn filter_eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, Comparison::Eq, value.into())
    }

    pub fn filter_ne(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, Comparison::Ne, value.into())
    }

    pub fn filter_gt(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, Comparison::Gt, value.into())
    }

    pub fn filter_lt(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, Comparison::Lt, value.into())
    }

    /// Append a sort key.
    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order_by.push((column.to_string(), direction));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Bypass the soft-delete filter.
    pub fn with_trashed(mut self) -> Self {
        self.with_trashed = true;
        self
    }

    /// Check whether a record passes every condition.
    pub fn matches<R: Sortable>(&self, record: &R) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
    }

    /// Compare two records by the sort keys. Equal records keep their input order
    /// when used with a stable sort.
    pub fn compare<R: Sortable>(&self, a: &R, b: &R) -> Ordering {
        for (column, direction) in &self.order_by {
            let left = a.attribute(column).unwrap_or(Value::Null);
            let right = b.attribute(column).unwrap_or(Value::Null);
            let ordering = match direction {
                Direction::Asc => compare_values(&left, &right),
                Direction::Desc => compare_values(&right, &left),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: null < bool < number < string < array < object.
///
/// Integers compare exactly; mixed integer/float falls back to `f64`.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => {
                let x = x.as_f64().unwrap_or(f64::NAN);
                let y = y.as_f64().unwrap_or(f64::NAN);
                x.total_cmp(&y)
            }
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y) {
                let ordering = compare_values(l, r);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(_), Value::Object(_)) => a.to_string().cmp(&b.to_string()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
