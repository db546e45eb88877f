//! Error types for binding
//!
//! Binder failures mean the program is malformed; they abort binding and are
//! never represented as values. Evaluation errors are ordinary values, see
//! [`ErrorValue`](crate::value::ErrorValue).

use thiserror::Error;

use crate::syntax::Offset;
use crate::value::Value;

/// A fatal binding failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// A reference names nothing in scope
    #[error("undefined reference `{name}` at offset {offset}")]
    UndefinedReference {
        /// The unresolved name
        name: String,
        /// Where the reference appears
        offset: Offset,
    },

    /// The same name appears twice in one let
    #[error("duplicate binding `{name}` in let at offset {offset}")]
    DuplicateBinding {
        /// The repeated name
        name: String,
        /// Where the second binding appears
        offset: Offset,
    },

    /// A `#name` variable pattern used as an ordinary expression
    #[error("variable pattern `#{name}` outside of a match pattern at offset {offset}")]
    PatternOutsideMatch {
        /// The variable name
        name: String,
        /// Where it appears
        offset: Offset,
    },

    /// More than one projection in one array or record pattern
    #[error("pattern at offset {offset} has more than one projection")]
    MultipleProjections {
        /// The offending pattern
        offset: Offset,
    },
}

impl BindError {
    /// The source offset the failure is attached to.
    pub fn offset(&self) -> Offset {
        match self {
            BindError::UndefinedReference { offset, .. }
            | BindError::DuplicateBinding { offset, .. }
            | BindError::PatternOutsideMatch { offset, .. }
            | BindError::MultipleProjections { offset } => *offset,
        }
    }
}

/// Result type alias for binding.
pub type Result<T> = std::result::Result<T, BindError>;

/// Get a human-readable kind name for a value.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Int(_) => "int",
        Value::Float(_) => "float",
        Value::Str(_) => "string",
        Value::Array(_) => "array",
        Value::Record(_) => "record",
        Value::Quote(_) => "quote",
        Value::Closure(_) => "lambda",
        Value::Native(_) => "native function",
        Value::Error(_) => "error",
    }
}
