//! Vision confirmation port
//!
//! Optional secondary check for expression selection: a vision-capable model
//! is shown a representative image per candidate expression and asked which
//! one fits the content best. Failures here are never user-visible; the
//! resolver falls back to local scoring.

use async_trait::async_trait;
use domain::Expression;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// A candidate expression plus the image representing it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionCandidateImage {
    /// The catalog expression this image represents
    pub expression: Expression,
    /// URL (or data URI) of the mascot frame showing this expression
    pub image_url: String,
}

/// The vision model's judgement
///
/// `expression_name` is untrusted free text and must be validated through
/// `Expression::parse_lenient` before use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionVerdict {
    /// Name of the selected expression, as the model wrote it
    pub expression_name: String,
    /// Model-reported confidence (0.0 - 1.0)
    pub confidence: f32,
    /// Model-reported reasoning, used for observability only
    pub reason: String,
}

/// Port for the vision confirmation capability
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VisionPort: Send + Sync {
    /// Ask the model to pick the best-matching expression for `content`
    /// among `candidates`.
    async fn analyze_expression_images(
        &self,
        content: &str,
        candidates: &[ExpressionCandidateImage],
    ) -> Result<VisionVerdict, ApplicationError>;
}
