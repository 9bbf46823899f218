//! Comparator library: typed predicates over a resolved field.
//!
//! Each builder takes a [`FieldRef`], an [`Op`] and the raw literal, checks
//! that the operator fits the value type, coerces the literal and returns a
//! [`Predicate`]. The builders know nothing about attribute paths or the
//! schema; a failure comes back as a [`Mismatch`] for the caller to attach
//! the path to.
//!
//! `pr` (present) is accepted by every builder and skips coercion entirely.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::FilterError;
use crate::op::Op;
use crate::resolver::FieldRef;
use crate::value::{Value, ValueType};

/// Coerced comparison literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Code(String),
}

/// Why a comparator rejected its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// The operator does not apply to the value type.
    Operator { op: Op, value_type: ValueType },
    /// The literal is missing or cannot be coerced.
    Literal {
        value_type: ValueType,
        literal: String,
    },
}

impl Mismatch {
    /// Attaches the attribute path and converts into a [`FilterError`].
    pub fn into_error(self, path: &str) -> FilterError {
        match self {
            Mismatch::Operator { op, value_type } => FilterError::UnsupportedOperator {
                path: path.to_string(),
                op: op.as_str(),
                value_type: value_type.as_str(),
            },
            Mismatch::Literal {
                value_type,
                literal,
            } => FilterError::InvalidLiteralForType {
                path: path.to_string(),
                expected: value_type.as_str(),
                literal,
            },
        }
    }
}

/// A compiled filter leaf: one boolean condition on one stored field.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    field: FieldRef,
    op: Op,
    value_type: ValueType,
    literal: Option<Literal>,
}

impl Predicate {
    fn present(field: FieldRef, value_type: ValueType) -> Self {
        Predicate {
            field,
            op: Op::Present,
            value_type,
            literal: None,
        }
    }

    fn compare(field: FieldRef, op: Op, value_type: ValueType, literal: Literal) -> Self {
        Predicate {
            field,
            op,
            value_type,
            literal: Some(literal),
        }
    }

    pub fn field(&self) -> &FieldRef {
        &self.field
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// The coerced literal; `None` for `pr`.
    pub fn literal(&self) -> Option<&Literal> {
        self.literal.as_ref()
    }

    /// Evaluates this predicate against a stored value.
    ///
    /// A null value never matches a comparison, and only `pr` looks at
    /// presence.
    pub fn matches(&self, value: &Value<'_>) -> bool {
        if self.op == Op::Present {
            return value.is_present();
        }

        match (&self.literal, value) {
            (Some(Literal::String(pattern)), Value::String(s)) => self.match_string(s, pattern),
            (Some(Literal::Bool(expected)), Value::Bool(b)) => *b == *expected,
            (Some(Literal::Timestamp(ts)), Value::Timestamp(field_ts)) => {
                self.op.eval_ordering(field_ts.cmp(ts))
            }
            (Some(Literal::Code(code)), Value::Code(c)) => *c == code.as_str(),

            // Null or type mismatch
            _ => false,
        }
    }

    fn match_string(&self, field: &str, pattern: &str) -> bool {
        match self.op {
            Op::Contains => field.contains(pattern),
            Op::StartsWith => field.starts_with(pattern),
            _ => self.op.eval_ordering(Ord::cmp(field, pattern)),
        }
    }
}

/// Builds a predicate on a string field.
pub fn compare_string(
    field: FieldRef,
    op: Op,
    literal: Option<&str>,
) -> Result<Predicate, Mismatch> {
    build(field, op, ValueType::String, literal, |raw| {
        Some(Literal::String(raw.to_string()))
    })
}

/// Builds a predicate on a boolean field. Accepts `true`/`false` in any case.
pub fn compare_boolean(
    field: FieldRef,
    op: Op,
    literal: Option<&str>,
) -> Result<Predicate, Mismatch> {
    build(field, op, ValueType::Boolean, literal, |raw| {
        parse_bool(raw).map(Literal::Bool)
    })
}

/// Builds a predicate on a timestamp field. The literal must be ISO-8601.
pub fn compare_timestamp(
    field: FieldRef,
    op: Op,
    literal: Option<&str>,
) -> Result<Predicate, Mismatch> {
    build(field, op, ValueType::Timestamp, literal, |raw| {
        parse_timestamp(raw).map(Literal::Timestamp)
    })
}

/// Builds a predicate on an enumerated-code field. The literal must be one of
/// `legal`, matched exactly.
pub fn compare_code(
    field: FieldRef,
    op: Op,
    value_type: ValueType,
    literal: Option<&str>,
    legal: &[String],
) -> Result<Predicate, Mismatch> {
    build(field, op, value_type, literal, |raw| {
        legal
            .iter()
            .any(|code| code == raw)
            .then(|| Literal::Code(raw.to_string()))
    })
}

fn build<F>(
    field: FieldRef,
    op: Op,
    value_type: ValueType,
    literal: Option<&str>,
    coerce: F,
) -> Result<Predicate, Mismatch>
where
    F: FnOnce(&str) -> Option<Literal>,
{
    if !op.accepts(value_type) {
        return Err(Mismatch::Operator { op, value_type });
    }
    if op == Op::Present {
        return Ok(Predicate::present(field, value_type));
    }

    let raw = literal.ok_or_else(|| Mismatch::Literal {
        value_type,
        literal: String::new(),
    })?;
    let coerced = coerce(raw).ok_or_else(|| Mismatch::Literal {
        value_type,
        literal: raw.to_string(),
    })?;
    Ok(Predicate::compare(field, op, value_type, coerced))
}

/// Parses `true`/`false`, ignoring case.
pub fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Parses an ISO-8601 date-time.
///
/// Accepts extended-format date-times with an offset (`Z`, `+hh:mm` or
/// `+hhmm`, seconds optional), local date-times (taken as UTC) and a bare
/// date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // `%#z` takes `Z`, `+01`, `+0100` and `+01:00`
    for format in ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M%#z"] {
        if let Ok(ts) = DateTime::parse_from_str(raw, format) {
            return Some(ts.with_timezone(&Utc));
        }
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
