//! Filter queries and in-memory execution.
//!
//! A [`FilterQuery`] is one compilation pass: a [`QueryContext`] holding the
//! root kind and its joins, plus the compiled leaves. All leaves must hold
//! for a resource to match.
//!
//! # Join Semantics
//!
//! Every join is a left outer join. For each resource, each join contributes
//! the relation's rows, or a single null row when the collection is empty.
//! The resource matches when at least one combination of joined rows
//! satisfies every leaf:
//!
//! ```text
//! match = ∃ (r1 ∈ rows(join1) ∪ null, r2 ∈ rows(join2) ∪ null, ...)
//!           ∀ leaf: leaf(root, r1, r2, ...)
//! ```
//!
//! A leaf reads the root or a single join, so this is evaluated as: every
//! root leaf holds, and each join has a row satisfying all of its leaves.
//! The cost per resource is the sum of the collection sizes, not their
//! product.
//!
//! Leaves on the same relation share a join and so constrain the same row:
//! `emails.value eq "a@b.com"` with `emails.type eq "work"` needs one email
//! that is both. A matching resource is returned once no matter how many
//! row combinations satisfy it.

use crate::comparator::Predicate;
use crate::compiler::Compiler;
use crate::error::Result;
use crate::join::QueryContext;
use crate::model::{Resource, Row};
use crate::op::Op;
use crate::resolver::FieldRef;
use crate::schema::ResourceKind;
use crate::value::Value;

/// A conjunction of compiled filter leaves over one resource kind.
///
/// # Example
///
/// ```
/// use scim_filter::{Compiler, FieldRegistry, FilterQuery, Op, ResourceKind};
///
/// let registry = FieldRegistry::default();
/// let compiler = Compiler::new(&registry);
///
/// let query = FilterQuery::new(ResourceKind::User)
///     .and(&compiler, "emails.value", Op::Eq, Some("a@b.com"))?
///     .and(&compiler, "emails.type", Op::Eq, Some("work"))?;
///
/// assert_eq!(query.predicates().len(), 2);
/// assert_eq!(query.context().joins().len(), 1);
/// # Ok::<(), scim_filter::FilterError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FilterQuery {
    context: QueryContext,
    predicates: Vec<Predicate>,
}

impl FilterQuery {
    /// Creates an empty query. An empty query matches every resource of its
    /// kind.
    pub fn new(kind: ResourceKind) -> Self {
        FilterQuery {
            context: QueryContext::new(kind),
            predicates: Vec::new(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.context.root()
    }

    /// The compilation context: root kind and joins.
    pub fn context(&self) -> &QueryContext {
        &self.context
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Returns `true` if the query has no leaves.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Compiles a leaf in this query's context and adds it.
    pub fn add(
        &mut self,
        compiler: &Compiler<'_>,
        path: &str,
        op: Op,
        literal: Option<&str>,
    ) -> Result<()> {
        let predicate = compiler.compile(&mut self.context, path, op, literal)?;
        self.predicates.push(predicate);
        Ok(())
    }

    /// Builder form of [`add`](Self::add).
    pub fn and(
        mut self,
        compiler: &Compiler<'_>,
        path: &str,
        op: Op,
        literal: Option<&str>,
    ) -> Result<Self> {
        self.add(compiler, path, op, literal)?;
        Ok(self)
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Tests whether one resource matches.
    ///
    /// Resources of another kind never match.
    pub fn matches<R: Resource>(&self, item: &R) -> bool {
        if R::KIND != self.kind() {
            return false;
        }

        let joins = self.context.joins();
        let mut per_join: Vec<Vec<&Predicate>> = vec![Vec::new(); joins.len()];
        for predicate in &self.predicates {
            match *predicate.field() {
                FieldRef::Joined { join, .. } if join.index() < joins.len() => {
                    per_join[join.index()].push(predicate);
                }
                field => {
                    if !predicate.matches(&field_value(item, None, &field)) {
                        return false;
                    }
                }
            }
        }

        // Each leaf reads at most one join, so rows are picked per join
        joins.iter().zip(&per_join).all(|(join, leaves)| {
            if leaves.is_empty() {
                return true;
            }
            let related = item.related_rows(join.relation);
            if related.is_empty() {
                return leaves.iter().all(|p| p.matches(&Value::None));
            }
            related.into_iter().any(|row| {
                leaves
                    .iter()
                    .all(|p| p.matches(&field_value(item, Some(row), p.field())))
            })
        })
    }

    /// Filters a slice, returning references to matching resources in input
    /// order.
    pub fn filter<'a, R: Resource>(&self, items: &'a [R]) -> Vec<&'a R> {
        items.iter().filter(|item| self.matches(*item)).collect()
    }

    /// Counts the matching resources.
    pub fn count<R: Resource>(&self, items: &[R]) -> usize {
        items.iter().filter(|item| self.matches(*item)).count()
    }

    /// Returns `true` if any resource matches.
    pub fn any<R: Resource>(&self, items: &[R]) -> bool {
        items.iter().any(|item| self.matches(item))
    }

    /// Finds the first matching resource.
    pub fn find<'a, R: Resource>(&self, items: &'a [R]) -> Option<&'a R> {
        items.iter().find(|item| self.matches(*item))
    }
}

fn field_value<'a, R: Resource>(
    item: &'a R,
    row: Option<&'a dyn Row>,
    field: &FieldRef,
) -> Value<'a> {
    match *field {
        FieldRef::Root { column } => item.column_value(column),
        FieldRef::Embedded { object, column } => item
            .embedded_row(object)
            .map_or(Value::None, |row| row.column_value(column)),
        FieldRef::Joined { column, .. } => row.map_or(Value::None, |row| row.column_value(column)),
    }
}
