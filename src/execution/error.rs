use thiserror::Error;

use crate::table::TableError;

/// Failure of a single expression. All three kinds are recoverable: callers
/// log them and drop the value they were computing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// unknown identifier, function or column
    #[error("NameError: {0}")]
    Name(String),
    /// operand or argument of the wrong type or shape
    #[error("TypeError: {0}")]
    Type(String),
    /// malformed expression text
    #[error("SyntaxError: {0}")]
    Syntax(String),
}

impl EvalError {
    pub fn name(msg: impl Into<String>) -> Self {
        EvalError::Name(msg.into())
    }

    pub fn type_err(msg: impl Into<String>) -> Self {
        EvalError::Type(msg.into())
    }
}

impl From<TableError> for EvalError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::MissingColumn(_) => EvalError::Name(err.to_string()),
            _ => EvalError::Type(err.to_string()),
        }
    }
}
