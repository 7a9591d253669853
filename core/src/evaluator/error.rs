//! Runtime evaluation errors.
//!
//! Errors travel through evaluation as [`Value::Error`](crate::values::Value)
//! so that logical operators can absorb them. [`Program::eval`] turns an
//! error result into `Err`.
//!
//! [`Program::eval`]: crate::api::Program::eval

use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("no such field: {0}")]
    NoSuchField(String),

    #[error("no such key: {0}")]
    NoSuchKey(String),

    #[error("no matching overload for '{function}' applied to ({args})")]
    NoSuchOverload { function: String, args: String },

    #[error("type conversion error from '{from}' to '{to}'")]
    Conversion { from: String, to: String },

    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// Error returned by a host function.
    #[error("{0}")]
    Native(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("modulus by zero")]
    ModulusByZero,

    #[error("index out of bounds: {index} (length {len})")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("{0} overflow")]
    Overflow(String),

    #[error("undeclared reference to '{0}'")]
    UnknownIdentifier(String),

    #[error("unknown type: {0}")]
    UnknownType(String),

    /// Resource limit; not absorbed by logical operators.
    #[error("evaluation depth {depth} exceeds limit {max_depth}")]
    DepthExceeded { depth: usize, max_depth: usize },
}

impl EvalError {
    pub fn conversion(from: impl Display, to: impl Display) -> Self {
        EvalError::Conversion {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn no_such_overload(function: &str, args: &[crate::values::Value]) -> Self {
        EvalError::NoSuchOverload {
            function: function.to_string(),
            args: args
                .iter()
                .map(|a| a.ty().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
