use std::cmp::Ordering;
use std::sync::Arc;

use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single field of a record.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Enum(String),
}

impl Value {
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Text(s) | Value::Enum(s) => s.is_empty(),
            _ => false,
        }
    }

    // Used to order values of different kinds against each other.
    fn rank(&self) -> u8 {
        match self {
            Value::Empty => 0,
            Value::Number(_) => 1,
            Value::Date(_) => 2,
            Value::Enum(_) => 3,
            Value::Text(_) => 4,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Empty)
    }
}

/// Semantic type of a column. Every kind brings its own stringifier and comparator.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ColumnKind {
    #[default]
    Text,
    Number,
    Date,
    /// Variants in their natural order, e.g. `["pending", "partial", "paid"]`.
    Enum(Arc<[String]>),
}

impl ColumnKind {
    pub fn enumeration<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ColumnKind::Enum(variants.into_iter().map(Into::into).collect())
    }

    /// An enum without declared variants accepts any enum value.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ColumnKind::Enum(variants), Value::Enum(v)) => {
                variants.is_empty() || variants.iter().any(|d| d == v)
            }
            _ => matches!(
                (self, value),
                (_, Value::Empty)
                    | (ColumnKind::Text, Value::Text(_))
                    | (ColumnKind::Number, Value::Number(_))
                    | (ColumnKind::Date, Value::Date(_))
            ),
        }
    }

    pub fn display(&self, value: &Value) -> String {
        match value {
            Value::Empty => String::new(),
            Value::Text(s) | Value::Enum(s) => s.clone(),
            Value::Number(n) => format_number(*n),
            Value::Date(d) => d.format(DATE_FORMAT).to_string(),
        }
    }

    /// Total order used for sorting. Empty values come first.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match (a, b) {
            (Value::Empty, Value::Empty) => Ordering::Equal,
            (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
            (Value::Date(x), Value::Date(y)) => x.cmp(y),
            (Value::Text(x), Value::Text(y)) | (Value::Enum(x), Value::Enum(y)) => x.cmp(y),
            _ => a.rank().cmp(&b.rank()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Number => "number",
            ColumnKind::Date => "date",
            ColumnKind::Enum(_) => "enum",
        }
    }
}

/// Integral numbers are printed without a fraction: `5`, `-3`, `5.5`.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
