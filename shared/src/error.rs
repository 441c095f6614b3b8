//! Model-level errors

use thiserror::Error;

/// Errors raised while parsing names or validating editor payloads
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Unknown view: {0}")]
    UnknownView(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Order has no items")]
    EmptyOrder,

    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl ModelError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;
