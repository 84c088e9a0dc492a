use thiserror::Error;

use super::spec::ParamKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("parameter '{0}' is already declared")]
    DuplicateParameter(String),

    #[error("cannot bind '{0}': parameter was never declared")]
    UnboundParameter(String),

    #[error("parameter '{0}' already has a control")]
    AlreadyBound(String),

    #[error("parameter '{name}' expects a {expected} value, got {found}")]
    TypeMismatch {
        name: String,
        expected: ParamKind,
        found: ParamKind,
    },

    #[error("'{value}' is not an option of '{name}' (options: {options:?})")]
    InvalidChoice {
        name: String,
        value: String,
        options: Vec<String>,
    },

    #[error("{value} is outside [{min}, {max}] for '{name}'")]
    OutOfRange {
        name: String,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("a {widget} cannot edit {kind} parameter '{name}'")]
    WidgetMismatch {
        name: String,
        widget: &'static str,
        kind: ParamKind,
    },

    #[error("invalid declaration for '{name}': {reason}")]
    InvalidSpec { name: String, reason: String },

    #[error("cannot parse '{input}' for '{name}': {reason}")]
    Parse {
        name: String,
        input: String,
        reason: String,
    },
}
