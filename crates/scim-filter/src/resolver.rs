//! Attribute path resolution.
//!
//! Turns an attribute path into a [`FieldRef`] that says where the value is
//! stored relative to the query root:
//!
//! | Path shape | Example | Locator |
//! |------------|---------|---------|
//! | root field | `username` | column on the root row |
//! | embedded field | `name.familyname` | column of the `name` sub-object |
//! | relation field | `emails.type` | column on the joined `emails` row |
//! | bare relation | `emails` | same as `emails.value` |
//!
//! Relation fields go through the [`QueryContext`] join registry, so every
//! leaf addressing the same relation shares one join.

use std::fmt;

use crate::error::{FilterError, Result};
use crate::join::{JoinHandle, QueryContext};
use crate::schema::{Embedded, Relation, ResourceKind, Schema};

/// Field that a bare relation path addresses.
const DEFAULT_RELATION_FIELD: &str = "value";

/// Unresolved shape of an attribute path, as lowercase path segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// A field on the root resource.
    Root(&'static str),
    /// A field on a singular embedded object.
    Embedded(&'static str, &'static str),
    /// A field on a multi-valued relation; `None` means the bare relation.
    Relation(&'static str, Option<&'static str>),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Root(field) => f.write_str(field),
            Target::Embedded(object, field) => write!(f, "{}.{}", object, field),
            Target::Relation(relation, Some(field)) => write!(f, "{}.{}", relation, field),
            Target::Relation(relation, None) => f.write_str(relation),
        }
    }
}

/// Resolved location of a stored field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRef {
    /// Column on the root row.
    Root { column: &'static str },
    /// Column of an embedded object.
    Embedded {
        object: Embedded,
        column: &'static str,
    },
    /// Column on a joined relation row.
    Joined {
        join: JoinHandle,
        relation: Relation,
        column: &'static str,
    },
}

impl FieldRef {
    /// Internal column name.
    pub fn column(&self) -> &'static str {
        match self {
            FieldRef::Root { column }
            | FieldRef::Embedded { column, .. }
            | FieldRef::Joined { column, .. } => column,
        }
    }
}

/// Resolves attribute paths against the storage schema of one resource kind.
#[derive(Debug, Clone, Copy)]
pub struct AttributeResolver {
    schema: &'static Schema,
}

impl AttributeResolver {
    pub fn new(kind: ResourceKind) -> Self {
        AttributeResolver {
            schema: kind.schema(),
        }
    }

    /// Parses a dotted path into a [`Target`] known to the schema.
    ///
    /// Segments are matched exactly; the vocabulary is lowercase.
    pub(crate) fn parse(&self, path: &str) -> Result<Target> {
        let mut segments = path.split('.');
        let head = segments.next().unwrap_or_default();
        let tail = segments.next();
        if segments.next().is_some() {
            return Err(malformed(path, "paths have at most two segments"));
        }

        match tail {
            None => {
                if let Some(column) = self.schema.column(head) {
                    Ok(Target::Root(column.segment))
                } else if let Some((relation, _)) = self.schema.relation(head) {
                    Ok(Target::Relation(relation.segment(), None))
                } else if self.schema.embedded(head).is_some() {
                    Err(malformed(path, "embedded object addressed without a field"))
                } else {
                    Err(malformed(path, format!("unknown attribute '{}'", head)))
                }
            }
            Some(field) => {
                if let Some((object, columns)) = self.schema.embedded(head) {
                    let column = Schema::sub_column(columns, field).ok_or_else(|| {
                        malformed(path, format!("'{}' has no field '{}'", head, field))
                    })?;
                    Ok(Target::Embedded(object.segment(), column.segment))
                } else if let Some((relation, columns)) = self.schema.relation(head) {
                    let column = Schema::sub_column(columns, field).ok_or_else(|| {
                        malformed(path, format!("'{}' has no field '{}'", head, field))
                    })?;
                    Ok(Target::Relation(relation.segment(), Some(column.segment)))
                } else {
                    Err(malformed(
                        path,
                        format!("'{}' is not an embedded object or relation", head),
                    ))
                }
            }
        }
    }

    /// Resolves a target to a field locator, requesting the relation's join
    /// from `ctx` when the field lives on a multi-valued relation.
    pub fn resolve(&self, target: &Target, ctx: &mut QueryContext) -> Result<FieldRef> {
        if ctx.root() != self.schema.kind {
            return Err(malformed(
                &target.to_string(),
                format!(
                    "query is rooted at {} resources, not {}",
                    ctx.root(),
                    self.schema.kind
                ),
            ));
        }

        match *target {
            Target::Root(segment) => {
                let column = self
                    .schema
                    .column(segment)
                    .ok_or_else(|| self.shape_error(target, segment))?;
                Ok(FieldRef::Root {
                    column: column.name,
                })
            }
            Target::Embedded(object, field) => {
                let (embedded, columns) = self
                    .schema
                    .embedded(object)
                    .ok_or_else(|| self.shape_error(target, object))?;
                let column = Schema::sub_column(columns, field).ok_or_else(|| {
                    malformed(
                        &target.to_string(),
                        format!("'{}' has no field '{}'", object, field),
                    )
                })?;
                Ok(FieldRef::Embedded {
                    object: embedded,
                    column: column.name,
                })
            }
            Target::Relation(name, field) => {
                let (relation, columns) = self
                    .schema
                    .relation(name)
                    .ok_or_else(|| self.shape_error(target, name))?;
                let field = field.unwrap_or(DEFAULT_RELATION_FIELD);
                let column = Schema::sub_column(columns, field).ok_or_else(|| {
                    malformed(
                        &target.to_string(),
                        format!("'{}' has no field '{}'", name, field),
                    )
                })?;
                let join = ctx.join_relation(relation);
                Ok(FieldRef::Joined {
                    join,
                    relation,
                    column: column.name,
                })
            }
        }
    }

    /// Parses and resolves in one step.
    #[cfg(test)]
    fn resolve_path(&self, path: &str, ctx: &mut QueryContext) -> Result<FieldRef> {
        let target = self.parse(path)?;
        self.resolve(&target, ctx)
    }

    /// Explains why `segment` does not fit the shape `target` expects.
    fn shape_error(&self, target: &Target, segment: &str) -> FilterError {
        let reason = if self.schema.relation(segment).is_some() {
            format!("'{}' is a multi-valued relation", segment)
        } else if self.schema.embedded(segment).is_some() {
            format!("'{}' is an embedded object", segment)
        } else if self.schema.column(segment).is_some() {
            format!("'{}' is a plain field", segment)
        } else {
            format!("unknown attribute '{}'", segment)
        };
        malformed(&target.to_string(), reason)
    }
}

fn malformed(path: &str, reason: impl Into<String>) -> FilterError {
    FilterError::MalformedAttributePath {
        path: path.to_string(),
        reason: reason.into(),
    }
}
