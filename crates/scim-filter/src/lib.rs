//! SCIM filter - attribute-path resolution and predicate compilation for
//! identity resource searches.
//!
//! A search filter arrives from the filter-string parser as leaves of the
//! form `(attribute path, operator, literal)`. This crate turns each leaf into
//! a typed [`Predicate`] over the relational storage of users and groups:
//!
//! - Exact, lowercase vocabulary of filterable paths per resource kind
//! - Type-aware comparison for strings, booleans, timestamps and enumerated
//!   codes
//! - One outer join per multi-valued relation per query, shared by every leaf
//!   on that relation
//! - In-memory execution and SQL rendering of the compiled query
//!
//! # Quick Start
//!
//! ```rust
//! use scim_filter::{Compiler, FieldRegistry, FilterQuery, Op, ResourceKind, SubResource, User};
//!
//! let registry = FieldRegistry::default();
//! let compiler = Compiler::new(&registry);
//!
//! let mut alice = User::new("u1", "alice");
//! alice.set_emails(vec![SubResource::new("alice@example.com").with_kind("work")]);
//! let mut bob = User::new("u2", "bob");
//! bob.set_emails(vec![SubResource::new("bob@example.com").with_kind("home")]);
//! let users = vec![alice, bob];
//!
//! // Both leaves constrain the same email row
//! let query = FilterQuery::new(ResourceKind::User)
//!     .and(&compiler, "emails.value", Op::Contains, Some("@example.com"))?
//!     .and(&compiler, "emails.type", Op::Eq, Some("work"))?;
//! assert_eq!(query.context().joins().len(), 1);
//!
//! let results = query.filter(&users);
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].user_name, "alice");
//!
//! let stmt = scim_filter::render(&query);
//! assert!(stmt.text.starts_with("SELECT DISTINCT u.internal_id FROM scim_user u"));
//! assert_eq!(stmt.params.len(), 2);
//! # Ok::<(), scim_filter::FilterError>(())
//! ```
//!
//! # Compilation
//!
//! ```text
//! path ──► FieldRegistry ──► AttributeResolver ──► comparator ──► Predicate
//!              │                    │
//!       UnsupportedFilterField   QueryContext (join registry)
//! ```
//!
//! Every failure is returned as a [`FilterError`]; nothing is logged and
//! swallowed. Whether a failed leaf rejects the search or is dropped is up to
//! the caller.
//!
//! # Field Types and Operators
//!
//! | Type | Operators |
//! |------|-----------|
//! | String | `eq`, `co`, `sw`, `gt`, `ge`, `lt`, `le`, `pr` |
//! | Boolean | `eq`, `pr` |
//! | Timestamp | `eq`, `gt`, `ge`, `lt`, `le`, `pr` |
//! | Code | `eq`, `pr` |
//!
//! `pr` never looks at the literal.

mod comparator;
mod compiler;
pub mod config;
mod error;
mod join;
mod model;
mod op;
mod query;
pub mod registry;
mod resolver;
mod schema;
pub mod sql;
mod value;

// Re-export public API
pub use comparator::{
    compare_boolean, compare_code, compare_string, compare_timestamp, Literal, Mismatch,
    Predicate,
};
pub use compiler::Compiler;
pub use config::{FilterConfig, TypeCodes};
pub use error::{ConfigError, FilterError, ModelError, Result};
pub use join::{Join, JoinHandle, JoinKind, QueryContext};
pub use model::{Group, Meta, Name, Resource, Row, SubResource, User};
pub use op::Op;
pub use query::FilterQuery;
pub use registry::{FieldRegistry, FilterField};
pub use resolver::{AttributeResolver, FieldRef, Target};
pub use schema::{Embedded, Relation, ResourceKind, Schema};
pub use sql::{render, SqlParam, SqlStatement};
pub use value::{Value, ValueType};
