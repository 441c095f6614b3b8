//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-success HTTP status
    #[error("Request to {target} failed with status {status}")]
    RequestFailed { target: String, status: u16 },

    /// Body was not the expected shape (recovered locally for collection fetches)
    #[error("Malformed response from {0}")]
    MalformedResponse(String),

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Editor payload rejected before sending
    #[error("Invalid record: {0}")]
    Model(#[from] shared::ModelError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The sync worker is no longer running
    #[error("Sync worker stopped")]
    WorkerStopped,
}

impl ClientError {
    pub fn request_failed(target: impl Into<String>, status: u16) -> Self {
        Self::RequestFailed {
            target: target.into(),
            status,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::RequestFailed { status: 404, .. })
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
