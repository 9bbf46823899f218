//! Predicate compilation.
//!
//! [`Compiler::compile`] turns one filter leaf `(path, op, literal)` into a
//! [`Predicate`]:
//!
//! 1. look the path up in the [`FieldRegistry`] for the context's root kind
//! 2. resolve the field's target, joining its relation through the context
//! 3. build the comparator for the field's value type
//!
//! The registry is only read, so one compiler can serve any number of
//! concurrent requests as long as each request owns its [`QueryContext`].

use tracing::debug;

use crate::comparator::{
    compare_boolean, compare_code, compare_string, compare_timestamp, Predicate,
};
use crate::error::{FilterError, Result};
use crate::join::QueryContext;
use crate::op::Op;
use crate::registry::{self, FieldRegistry};
use crate::resolver::AttributeResolver;
use crate::value::ValueType;

/// Compiles filter leaves against a field registry.
#[derive(Debug, Clone, Copy)]
pub struct Compiler<'r> {
    registry: &'r FieldRegistry,
}

impl<'r> Compiler<'r> {
    pub fn new(registry: &'r FieldRegistry) -> Self {
        Compiler { registry }
    }

    pub fn registry(&self) -> &'r FieldRegistry {
        self.registry
    }

    /// Compiles one leaf within `ctx`.
    ///
    /// `literal` is ignored for [`Op::Present`]. On failure the context may
    /// still hold a join requested during resolution; an unused join changes
    /// nothing about the result set.
    pub fn compile(
        &self,
        ctx: &mut QueryContext,
        path: &str,
        op: Op,
        literal: Option<&str>,
    ) -> Result<Predicate> {
        let kind = ctx.root();
        let field = self
            .registry
            .resolve(kind, path)
            .ok_or_else(|| FilterError::UnsupportedFilterField {
                kind,
                path: path.to_string(),
            })?;

        let resolved = AttributeResolver::new(kind).resolve(&field.target, ctx)?;

        let predicate = match field.value_type {
            ValueType::String => compare_string(resolved, op, literal),
            ValueType::Boolean => compare_boolean(resolved, op, literal),
            ValueType::Timestamp => compare_timestamp(resolved, op, literal),
            ValueType::Code(relation) => compare_code(
                resolved,
                op,
                field.value_type,
                literal,
                self.registry.codes(relation),
            ),
        }
        .map_err(|mismatch| mismatch.into_error(path))?;

        debug!(%kind, path, %op, column = resolved.column(), "compiled filter leaf");
        Ok(predicate)
    }

    /// Like [`compile`](Self::compile), taking the operator as a SCIM token.
    pub fn compile_token(
        &self,
        ctx: &mut QueryContext,
        path: &str,
        op: &str,
        literal: Option<&str>,
    ) -> Result<Predicate> {
        let op: Op = op.parse()?;
        self.compile(ctx, path, op, literal)
    }
}

impl Default for Compiler<'static> {
    /// A compiler over the process-wide registry.
    fn default() -> Self {
        Compiler::new(registry::global())
    }
}
