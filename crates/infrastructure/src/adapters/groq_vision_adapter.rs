//! Vision confirmation adapter over the Groq client
//!
//! Shows the vision model one mascot frame per candidate expression and asks
//! for a JSON verdict. Models wrap JSON in prose or code fences often enough
//! that extraction tolerates both.

use std::sync::Arc;

use ai_core::GroqClient;
use application::{
    error::ApplicationError,
    ports::{ExpressionCandidateImage, VisionPort, VisionVerdict},
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

/// [`VisionPort`] implementation backed by Groq's vision model
#[derive(Debug)]
pub struct GroqVisionAdapter {
    client: Arc<GroqClient>,
}

impl GroqVisionAdapter {
    pub const fn new(client: Arc<GroqClient>) -> Self {
        Self { client }
    }
}

fn build_prompt(content: &str, candidates: &[ExpressionCandidateImage]) -> String {
    let names: Vec<&str> = candidates.iter().map(|c| c.expression.name()).collect();
    format!(
        "A mascot is about to say: \"{content}\"\n\
         The attached images show these candidate expressions in order: {}.\n\
         Pick the expression whose image best matches the tone of the message.\n\
         Reply with only a JSON object: \
         {{\"expression\": \"<name>\", \"confidence\": <0.0-1.0>, \"reason\": \"<short>\"}}",
        names.join(", ")
    )
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    expression: String,
    #[serde(default = "default_confidence")]
    confidence: f32,
    #[serde(default)]
    reason: String,
}

const fn default_confidence() -> f32 {
    0.5
}

/// Extract a JSON verdict from model output that may wrap it in code fences
/// or surrounding prose
fn parse_verdict(content: &str) -> Option<VisionVerdict> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    let raw: RawVerdict = serde_json::from_str(content.get(start..=end)?).ok()?;

    Some(VisionVerdict {
        expression_name: raw.expression,
        confidence: raw.confidence.clamp(0.0, 1.0),
        reason: raw.reason,
    })
}

#[async_trait]
impl VisionPort for GroqVisionAdapter {
    #[instrument(skip_all, fields(candidates = candidates.len()))]
    async fn analyze_expression_images(
        &self,
        content: &str,
        candidates: &[ExpressionCandidateImage],
    ) -> Result<VisionVerdict, ApplicationError> {
        let prompt = build_prompt(content, candidates);
        let urls: Vec<String> = candidates.iter().map(|c| c.image_url.clone()).collect();

        let response = self
            .client
            .vision_completion(&prompt, &urls)
            .await
            .map_err(|e| ApplicationError::VisionCall(e.to_string()))?;

        parse_verdict(&response.content).ok_or_else(|| {
            ApplicationError::VisionCall(format!(
                "unparseable verdict: {}",
                response.content.chars().take(120).collect::<String>()
            ))
        })
    }
}
