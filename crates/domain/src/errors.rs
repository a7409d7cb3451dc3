//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    /// Expression name not present in the catalog
    #[error("Unknown expression: {0}")]
    UnknownExpression(String),
}
