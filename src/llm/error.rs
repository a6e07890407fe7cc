//! Error types for the completion client.

use thiserror::Error;

/// Result type for completion client operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Completion client errors.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Connection failed, timed out or the request could not be sent
    #[error("{0}")]
    Network(String),

    /// Non-2xx response from the completion endpoint
    #[error("{0}")]
    Api(String),

    /// Response body was not the expected completion shape
    #[error("{0}")]
    Parse(String),
}

impl LlmError {
    /// Whether the failure happened in transport or at the endpoint, as
    /// opposed to while reading its answer.
    pub fn is_request_failure(&self) -> bool {
        matches!(self, LlmError::Network(_) | LlmError::Api(_))
    }
}
