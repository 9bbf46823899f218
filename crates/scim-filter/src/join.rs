//! Query-scoped join registry.
//!
//! Filtering on a field of a multi-valued relation needs a join from the root
//! resource to the relation's rows. Two leaves on sibling fields of the same
//! relation (`emails.value` and `emails.type`) must share that join, otherwise
//! they would constrain two independent rows and the result would multiply.
//!
//! [`QueryContext`] owns the joins of one compilation pass and hands out a
//! single [`JoinHandle`] per alias.

use std::collections::HashMap;

use tracing::debug;

use crate::schema::{Relation, ResourceKind};

/// Reference to a join inside one [`QueryContext`].
///
/// Only meaningful for the context that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JoinHandle(usize);

impl JoinHandle {
    /// Position of the join in [`QueryContext::joins`].
    pub fn index(self) -> usize {
        self.0
    }
}

/// Join strategy. Joins are always outer so that resources with an empty
/// collection survive until the predicates are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    LeftOuter,
}

/// A join attached to the query root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub alias: &'static str,
    pub relation: Relation,
    pub kind: JoinKind,
}

/// Compilation state of one query: its root and the joins attached to it.
#[derive(Debug, Clone)]
pub struct QueryContext {
    root: ResourceKind,
    joins: Vec<Join>,
    by_alias: HashMap<&'static str, JoinHandle>,
}

impl QueryContext {
    /// Creates an empty context rooted at `root`.
    pub fn new(root: ResourceKind) -> Self {
        QueryContext {
            root,
            joins: Vec::new(),
            by_alias: HashMap::new(),
        }
    }

    /// Resource kind at the query root.
    pub fn root(&self) -> ResourceKind {
        self.root
    }

    /// Returns the join registered under `alias`, creating a left outer join
    /// on `relation` if there is none yet.
    pub fn get_or_create_join(&mut self, alias: &'static str, relation: Relation) -> JoinHandle {
        if let Some(handle) = self.lookup(alias) {
            debug!(alias, "reusing join");
            return handle;
        }

        let handle = JoinHandle(self.joins.len());
        self.joins.push(Join {
            alias,
            relation,
            kind: JoinKind::LeftOuter,
        });
        self.by_alias.insert(alias, handle);
        debug!(alias, table = relation.table(), "created left outer join");
        handle
    }

    /// Shorthand for [`get_or_create_join`](Self::get_or_create_join) with
    /// the relation's own alias.
    pub fn join_relation(&mut self, relation: Relation) -> JoinHandle {
        self.get_or_create_join(relation.alias(), relation)
    }

    /// Looks up an existing join by alias without creating one.
    pub(crate) fn lookup(&self, alias: &str) -> Option<JoinHandle> {
        self.by_alias.get(alias).copied()
    }

    /// Returns the join behind a handle.
    pub fn join(&self, handle: JoinHandle) -> Option<&Join> {
        self.joins.get(handle.0)
    }

    /// All joins, in creation order.
    pub fn joins(&self) -> &[Join] {
        &self.joins
    }
}
