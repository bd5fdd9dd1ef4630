use thiserror::Error;

use crate::violation::Validation;

/// Errors raised while turning a record schema into a plan.
///
/// A compile error aborts the whole type; nothing is cached, so every later
/// call against the same type fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("unknown check '{check}' on field {record}.{field}")]
    UnknownCheck {
        record: String,
        field: String,
        check: String,
    },
    #[error("check '{check}' does not support field {field} of kind {kind}: {reason}")]
    Unsupported {
        check: String,
        field: String,
        kind: String,
        reason: String,
    },
    #[error("invalid parameters for check '{check}': {reason}")]
    InvalidParameters { check: String, reason: String },
    #[error("invalid presence marker on {record}.{field}: {reason}")]
    Marker {
        record: String,
        field: String,
        reason: String,
    },
}

/// Errors raised by predicates or the executor while a validation runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("no parent record in session")]
    NoParent,
    #[error("field '{field}' not found on {record}")]
    FieldNotFound { field: String, record: String },
    #[error("unsupported value: {0}")]
    UnsupportedValue(String),
    #[error("cannot compare {left} with {right}")]
    Incomparable { left: String, right: String },
    #[error("maximum validation depth {0} exceeded")]
    DepthExceeded(usize),
    #[error("check error: {0}")]
    Check(String),
}

/// Errors raised while loading or writing validator settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Top-level error returned by the validator.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Failed(Validation),
}

pub type Result<T> = std::result::Result<T, Error>;
