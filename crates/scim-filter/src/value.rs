//! Declared field types and runtime column values.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::schema::Relation;

/// Declared type of a filterable field. Decides which operators apply and
/// how the literal is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    /// `true` / `false`, any case.
    Boolean,
    /// ISO-8601 date-time.
    Timestamp,
    /// Closed set of codes, configured per relation.
    Code(Relation),
}

impl ValueType {
    /// Name used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Boolean => "boolean",
            ValueType::Timestamp => "timestamp",
            ValueType::Code(_) => "code",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored column value, borrowed from its row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    String(&'a str),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Code(&'a str),
    /// Null column, or no row at all on the outer side of a join.
    None,
}

impl Value<'_> {
    /// Whether the value counts for `pr`: non-null, and non-empty for text.
    pub fn is_present(&self) -> bool {
        match self {
            Value::String(s) | Value::Code(s) => !s.is_empty(),
            Value::Bool(_) | Value::Timestamp(_) => true,
            Value::None => false,
        }
    }
}

impl<'a> From<Option<&'a String>> for Value<'a> {
    fn from(value: Option<&'a String>) -> Self {
        value.map_or(Value::None, |s| Value::String(s))
    }
}

impl From<Option<bool>> for Value<'_> {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Value::None, Value::Bool)
    }
}

impl From<Option<DateTime<Utc>>> for Value<'_> {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(Value::None, Value::Timestamp)
    }
}
