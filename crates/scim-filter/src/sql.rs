//! SQL rendering.
//!
//! Renders a [`FilterQuery`] as a parameterized `SELECT` over the root table
//! for the query-execution layer:
//!
//! ```text
//! SELECT DISTINCT u.internal_id FROM scim_user u
//!   LEFT OUTER JOIN scim_email emails ON emails.user_internal_id = u.internal_id
//!   WHERE emails.value = $1 AND emails.type = $2
//! ```
//!
//! Literals are never inlined; each becomes a positional bind parameter.
//! `co` and `sw` render as `LIKE` with `%`, `_` and `\` escaped in the
//! literal.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::comparator::{Literal, Predicate};
use crate::join::QueryContext;
use crate::op::Op;
use crate::query::FilterQuery;
use crate::resolver::FieldRef;
use crate::value::ValueType;

/// A bind parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

/// Rendered statement text and its parameters, in `$n` order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub text: String,
    pub params: Vec<SqlParam>,
}

/// Renders `query` as a `SELECT DISTINCT` of root internal ids.
pub fn render(query: &FilterQuery) -> SqlStatement {
    let ctx = query.context();
    let kind = ctx.root();
    let root = kind.root_alias();

    let mut text = format!("SELECT DISTINCT {root}.internal_id FROM {} {root}", kind.table());
    for join in ctx.joins() {
        text.push_str(&format!(
            " LEFT OUTER JOIN {table} {alias} ON {alias}.{owner} = {root}.internal_id",
            table = join.relation.table(),
            alias = join.alias,
            owner = join.relation.owner_column(),
        ));
    }

    let mut params = Vec::new();
    let conditions: Vec<String> = query
        .predicates()
        .iter()
        .map(|p| condition(ctx, p, &mut params))
        .collect();
    if !conditions.is_empty() {
        text.push_str(" WHERE ");
        text.push_str(&conditions.join(" AND "));
    }

    debug!(%kind, joins = ctx.joins().len(), params = params.len(), "rendered filter query");
    SqlStatement { text, params }
}

fn column(ctx: &QueryContext, field: &FieldRef) -> String {
    let root = ctx.root().root_alias();
    match *field {
        FieldRef::Root { column } => format!("{}.{}", root, column),
        FieldRef::Embedded { object, column } => {
            format!("{}.{}{}", root, object.column_prefix(), column)
        }
        FieldRef::Joined {
            join,
            relation,
            column,
        } => {
            let alias = ctx.join(join).map_or(relation.alias(), |j| j.alias);
            format!("{}.{}", alias, column)
        }
    }
}

fn condition(ctx: &QueryContext, predicate: &Predicate, params: &mut Vec<SqlParam>) -> String {
    let col = column(ctx, predicate.field());

    let operator = match predicate.op() {
        Op::Present => return present(&col, predicate.value_type()),
        Op::Contains | Op::StartsWith => "LIKE",
        Op::Eq => "=",
        Op::Gt => ">",
        Op::Gte => ">=",
        Op::Lt => "<",
        Op::Lte => "<=",
    };

    // Every non-`pr` predicate carries a literal
    let Some(literal) = predicate.literal() else {
        return "FALSE".to_string();
    };

    let param = match (predicate.op(), literal) {
        (Op::Contains, Literal::String(s)) => SqlParam::Text(format!("%{}%", escape_like(s))),
        (Op::StartsWith, Literal::String(s)) => SqlParam::Text(format!("{}%", escape_like(s))),
        (_, Literal::String(s)) | (_, Literal::Code(s)) => SqlParam::Text(s.clone()),
        (_, Literal::Bool(b)) => SqlParam::Bool(*b),
        (_, Literal::Timestamp(ts)) => SqlParam::Timestamp(*ts),
    };
    params.push(param);
    let n = params.len();

    if operator == "LIKE" {
        format!("{col} LIKE ${n} ESCAPE '\\'")
    } else {
        format!("{col} {operator} ${n}")
    }
}

fn present(col: &str, value_type: ValueType) -> String {
    match value_type {
        ValueType::String | ValueType::Code(_) => format!("({col} IS NOT NULL AND {col} <> '')"),
        ValueType::Boolean | ValueType::Timestamp => format!("{col} IS NOT NULL"),
    }
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
