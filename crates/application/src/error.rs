//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
///
/// Derives `Clone` so that every waiter coalesced onto one in-flight request
/// can receive the identical rejection.
#[derive(Debug, Clone, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Pre-flight token budget rejection; the message was never sent
    #[error("Request over budget: {0}")]
    BudgetExceeded(String),

    /// The chat completion capability rejected or failed
    #[error("Chat call failed: {0}")]
    ChatCall(String),

    /// The vision confirmation capability rejected or failed.
    /// Never surfaced to the caller; the resolver falls back to local
    /// scoring instead.
    #[error("Vision call failed: {0}")]
    VisionCall(String),

    /// Request coordination failure (e.g. a flushed debounce timer)
    #[error("Coordination error: {0}")]
    Coordination(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Whether this error should be shown to the user.
    ///
    /// Only budget rejections and primary chat failures are user-visible;
    /// everything else is infrastructure-level and logged only.
    pub const fn is_user_visible(&self) -> bool {
        matches!(self, Self::BudgetExceeded(_) | Self::ChatCall(_))
    }
}
