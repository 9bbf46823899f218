//! Error types for filter compilation, configuration and the storage model.

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::{Relation, ResourceKind};

/// Errors returned when a single filter leaf cannot be compiled.
///
/// None of these are fatal: the request layer decides whether a failed leaf
/// rejects the whole search or is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// The attribute path is not part of the vocabulary for this resource kind.
    #[error("filtering on '{path}' is not supported for {kind} resources")]
    UnsupportedFilterField { kind: ResourceKind, path: String },

    /// The path is registered but its shape does not fit the storage schema.
    #[error("attribute path '{path}' cannot be resolved: {reason}")]
    MalformedAttributePath { path: String, reason: String },

    /// The literal could not be coerced to the field's value type.
    #[error("'{literal}' is not a valid {expected} value for '{path}'")]
    InvalidLiteralForType {
        path: String,
        expected: &'static str,
        literal: String,
    },

    /// The operator does not apply to the field's value type.
    #[error("operator '{op}' cannot be applied to {value_type} attribute '{path}'")]
    UnsupportedOperator {
        path: String,
        op: &'static str,
        value_type: &'static str,
    },

    /// The operator token is not a known filter operator.
    #[error("unknown filter operator '{0}'")]
    UnknownOperator(String),
}

/// Result type for filter compilation.
pub type Result<T> = std::result::Result<T, FilterError>;

/// Errors raised while loading or installing the filter configuration.
///
/// These surface at startup and are not meant to be recovered per request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read filter config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse filter config{}: {message}", path_suffix(.path))]
    Parse {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("type codes for {relation} must not be empty")]
    EmptyCodes { relation: Relation },

    #[error("type codes for {relation} contain a blank entry")]
    BlankCode { relation: Relation },

    #[error("type code '{code}' is listed twice for {relation}")]
    DuplicateCode { relation: Relation, code: String },

    #[error("the filter field registry is already installed")]
    AlreadyInstalled,
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" {}", p.display()),
        None => String::new(),
    }
}

/// Errors raised by the storage model when a record violates its constraints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("photo value '{0}' must end with .jpg, .jpeg, .png or .gif")]
    InvalidPhotoUrl(String),
}
