//! LLM client errors

use thiserror::Error;

/// Errors that can occur talking to the LLM provider
#[derive(Debug, Error)]
pub enum LlmError {
    /// Failed to connect to the provider
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the provider failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response parsing failed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Timeout during completion
    #[error("Completion timeout after {0}ms")]
    Timeout(u64),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Provider-side error
    #[error("Server error: {0}")]
    ServerError(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(30_000)
        } else if err.is_connect() {
            LlmError::ConnectionFailed(err.to_string())
        } else {
            LlmError::RequestFailed(err.to_string())
        }
    }
}
