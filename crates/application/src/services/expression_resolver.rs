//! Expression resolution for assistant responses
//!
//! Turns the scorer's ranked candidates into one final expression with a
//! confidence value. When a vision port is wired in, the top candidates are
//! confirmed against their mascot frames; any vision failure falls back to
//! local scoring silently. The fallback is single-shot: there is no retry
//! and no second vision call per resolution.

use std::sync::Arc;

use domain::Expression;
use parking_lot::Mutex;
use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, instrument, warn};

use crate::{
    ports::vision_port::{ExpressionCandidateImage, VisionPort},
    services::{expression_scorer::ExpressionScorer, variety::VarietyPolicy},
};

/// How many ranked candidates are offered to the vision model
const VISION_CANDIDATE_LIMIT: usize = 3;

/// Confidence floor/base for text-only resolution
const BASE_CONFIDENCE: f64 = 0.5;

/// A resolved expression with its confidence and rationale
#[derive(Debug, Clone)]
pub struct Resolution {
    pub expression: Expression,
    /// In `0.5..=1.0`; never reported lower than the base even for the
    /// neutral fallback
    pub confidence: f64,
    /// Rationale for observability, never shown to end users
    pub reason: String,
}

/// Resolves assistant response text to a mascot expression
pub struct ExpressionResolver {
    scorer: ExpressionScorer,
    variety: VarietyPolicy,
    vision: Option<Arc<dyn VisionPort>>,
    /// Base URL for per-expression mascot frames, e.g. `/mascot`
    image_base_url: String,
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for ExpressionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpressionResolver")
            .field("vision", &self.vision.is_some())
            .field("image_base_url", &self.image_base_url)
            .finish_non_exhaustive()
    }
}

impl ExpressionResolver {
    /// Text-only resolver
    #[must_use]
    pub fn new(scorer: ExpressionScorer) -> Self {
        Self {
            scorer,
            variety: VarietyPolicy::new(),
            vision: None,
            image_base_url: String::new(),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Resolver with vision confirmation enabled
    #[must_use]
    pub fn with_vision(
        scorer: ExpressionScorer,
        vision: Arc<dyn VisionPort>,
        image_base_url: impl Into<String>,
    ) -> Self {
        Self {
            vision: Some(vision),
            image_base_url: image_base_url.into(),
            ..Self::new(scorer)
        }
    }

    /// Deterministic random source, for tests
    #[cfg(test)]
    fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Resolve `content` to an expression, via vision when configured
    #[instrument(skip(self, content), fields(content_len = content.len()))]
    pub async fn resolve(&self, content: &str) -> Resolution {
        match &self.vision {
            Some(vision) => self.resolve_with_vision(Arc::clone(vision), content).await,
            None => self.resolve_from_text(content),
        }
    }

    /// Local scoring only: best candidate (variety-adjusted for weak
    /// fields), confidence derived from the winning score.
    #[must_use]
    pub fn resolve_from_text(&self, content: &str) -> Resolution {
        let candidates = self
            .scorer
            .score_expressions(content, VISION_CANDIDATE_LIMIT);

        let picked = {
            let mut rng = self.rng.lock();
            self.variety.pick(&candidates, &mut *rng)
        };

        let Some(expression) = picked else {
            return Resolution {
                expression: Expression::Idle,
                confidence: BASE_CONFIDENCE,
                reason: "no catalog signal".to_string(),
            };
        };

        // The variety policy may pick a lower rank; report that rank's score.
        let winner = candidates
            .iter()
            .find(|c| c.expression == expression)
            .unwrap_or(&candidates[0]);

        Resolution {
            expression,
            confidence: score_confidence(winner.score),
            reason: winner.reason_tags.join(", "),
        }
    }

    async fn resolve_with_vision(&self, vision: Arc<dyn VisionPort>, content: &str) -> Resolution {
        let candidates = self
            .scorer
            .score_expressions(content, VISION_CANDIDATE_LIMIT);
        if candidates.is_empty() {
            return self.resolve_from_text(content);
        }

        let images: Vec<ExpressionCandidateImage> = candidates
            .iter()
            .map(|c| ExpressionCandidateImage {
                expression: c.expression,
                image_url: format!("{}/{}.png", self.image_base_url, c.expression.name()),
            })
            .collect();

        match vision.analyze_expression_images(content, &images).await {
            Ok(verdict) => {
                let expression = Expression::parse_lenient(&verdict.expression_name);
                debug!(
                    expression = expression.name(),
                    confidence = verdict.confidence,
                    "Vision confirmation accepted"
                );
                Resolution {
                    expression,
                    confidence: f64::from(verdict.confidence).clamp(BASE_CONFIDENCE, 1.0),
                    reason: verdict.reason,
                }
            }
            Err(error) => {
                // Vision is a best-effort refinement; its failure must never
                // surface to the caller.
                warn!(%error, "Vision confirmation failed, using local scoring");
                self.resolve_from_text(content)
            }
        }
    }
}

/// Map a raw score to confidence: `0.5 + score / 10`, clamped to `0.5..=1.0`
fn score_confidence(score: f64) -> f64 {
    (BASE_CONFIDENCE + score / 10.0).clamp(BASE_CONFIDENCE, 1.0)
}
