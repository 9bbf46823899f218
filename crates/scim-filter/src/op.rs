//! SCIM filter operators.
//!
//! | Token | Variant | String | Boolean | Timestamp | Code |
//! |-------|---------|:------:|:-------:|:---------:|:----:|
//! | `eq` | [`Op::Eq`] | ✓ | ✓ | ✓ | ✓ |
//! | `co` | [`Op::Contains`] | ✓ | | | |
//! | `sw` | [`Op::StartsWith`] | ✓ | | | |
//! | `pr` | [`Op::Present`] | ✓ | ✓ | ✓ | ✓ |
//! | `gt` `ge` `lt` `le` | [`Op::Gt`] ... | ✓ | | ✓ | |

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::FilterError;
use crate::value::ValueType;

/// Comparison operator of a filter leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Eq,
    /// Substring match.
    Contains,
    /// Prefix match.
    StartsWith,
    /// The field holds a non-null, non-empty value. Takes no literal.
    Present,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Op {
    /// `true` for `gt`, `ge`, `lt` and `le`.
    pub fn is_ordering(self) -> bool {
        matches!(self, Op::Gt | Op::Gte | Op::Lt | Op::Lte)
    }

    /// Whether this operator can be applied to a field of `value_type`.
    pub fn accepts(self, value_type: ValueType) -> bool {
        match (self, value_type) {
            (Op::Eq | Op::Present, _) => true,
            (_, ValueType::String) => true,
            (op, ValueType::Timestamp) => op.is_ordering(),
            (_, ValueType::Boolean | ValueType::Code(_)) => false,
        }
    }

    /// Applies `eq` or an ordering operator to the result of comparing the
    /// stored value with the literal. Other operators yield `false`.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        use Ordering::{Equal, Greater, Less};
        matches!(
            (self, ordering),
            (Op::Eq, Equal)
                | (Op::Gt, Greater)
                | (Op::Gte, Greater | Equal)
                | (Op::Lt, Less)
                | (Op::Lte, Less | Equal)
        )
    }

    /// SCIM token of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Contains => "co",
            Op::StartsWith => "sw",
            Op::Present => "pr",
            Op::Gt => "gt",
            Op::Gte => "ge",
            Op::Lt => "lt",
            Op::Lte => "le",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Op {
    type Err = FilterError;

    /// Parses a SCIM operator token, ignoring case.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.to_ascii_lowercase().as_str() {
            "eq" => Ok(Op::Eq),
            "co" => Ok(Op::Contains),
            "sw" => Ok(Op::StartsWith),
            "pr" => Ok(Op::Present),
            "gt" => Ok(Op::Gt),
            "ge" => Ok(Op::Gte),
            "lt" => Ok(Op::Lt),
            "le" => Ok(Op::Lte),
            _ => Err(FilterError::UnknownOperator(token.to_string())),
        }
    }
}
