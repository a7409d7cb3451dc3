//! Prompt assembly and pre-flight budget validation
//!
//! Builds the persona system prompt and a compacted user prompt that embeds
//! the weather snapshot, estimates token cost, and rejects requests over the
//! per-request ceiling before they are ever dispatched.

use domain::WeatherSnapshot;

/// Fixed persona instruction block for the mascot
const SYSTEM_PROMPT: &str = "You are Kumo, a small cloud mascot on a weather dashboard. \
Answer in one to three short sentences, warm and a little playful. \
Ground weather answers in the conditions line when one is present. \
Never invent measurements that are not given to you.";

/// Tokens reserved for the model's reply when estimating request cost
const RESPONSE_TOKEN_BUFFER: u32 = 100;

/// Ellipsis appended by [`PromptBuilder::shorten_message`]
const ELLIPSIS: char = '…';

/// Assembled prompt pair plus its estimated token cost
#[derive(Debug, Clone)]
pub struct PromptPackage {
    pub system_prompt: String,
    pub user_prompt: String,
    /// `estimate_tokens(system) + estimate_tokens(user) + RESPONSE_TOKEN_BUFFER`
    pub estimated_tokens: u32,
}

/// Result of the pre-flight budget check
#[derive(Debug, Clone)]
pub struct BudgetCheck {
    pub is_valid: bool,
    /// Human-readable warning including the exact counts, set when invalid
    pub warning: Option<String>,
}

/// Stateless prompt assembly service
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// The fixed persona/style instruction block
    #[must_use]
    pub fn system_prompt(&self) -> String {
        SYSTEM_PROMPT.to_string()
    }

    /// Compact the user message, prefixing a single bracketed conditions
    /// line when a snapshot is present.
    ///
    /// Only defined fields are emitted; there are no placeholders for
    /// missing data. Precipitation appears only when greater than zero.
    #[must_use]
    pub fn compact_user_prompt(
        &self,
        message: &str,
        snapshot: Option<&WeatherSnapshot>,
    ) -> String {
        let Some(snapshot) = snapshot.filter(|s| !s.is_empty()) else {
            return message.to_string();
        };

        let mut fields: Vec<String> = Vec::with_capacity(6);
        if let Some(location) = &snapshot.location {
            fields.push(format!("\u{1f4cd} {location}"));
        }
        if let Some(temperature) = snapshot.temperature {
            fields.push(format!("\u{1f321}\u{fe0f} {}\u{b0}C", format_number(temperature)));
        }
        if let Some(condition) = &snapshot.condition {
            fields.push(format!("\u{2601}\u{fe0f} {condition}"));
        }
        if let Some(humidity) = snapshot.humidity {
            fields.push(format!("\u{1f4a7} {humidity}%"));
        }
        if let Some(wind_speed) = snapshot.wind_speed {
            fields.push(format!("\u{1f4a8} {}km/h", format_number(wind_speed)));
        }
        if let Some(precipitation) = snapshot.precipitation.filter(|p| *p > 0.0) {
            fields.push(format!("\u{1f327}\u{fe0f} {}mm", format_number(precipitation)));
        }

        if fields.is_empty() {
            return message.to_string();
        }

        format!("[{}]\n\n{message}", fields.join(" | "))
    }

    /// Deterministic character-based token approximation: `ceil(chars / 4)`.
    ///
    /// Not a real tokenizer; used consistently everywhere token counts are
    /// needed so results are comparable across the pipeline.
    #[must_use]
    #[allow(clippy::unused_self)]
    #[allow(clippy::cast_possible_truncation)] // prompt lengths are far below u32::MAX
    pub fn estimate_tokens(&self, text: &str) -> u32 {
        text.chars().count().div_ceil(4) as u32
    }

    /// Compose system + user prompt and estimate total request cost
    #[must_use]
    pub fn build_package(
        &self,
        message: &str,
        snapshot: Option<&WeatherSnapshot>,
    ) -> PromptPackage {
        let system_prompt = self.system_prompt();
        let user_prompt = self.compact_user_prompt(message, snapshot);
        let estimated_tokens = self.estimate_tokens(&system_prompt)
            + self.estimate_tokens(&user_prompt)
            + RESPONSE_TOKEN_BUFFER;

        PromptPackage {
            system_prompt,
            user_prompt,
            estimated_tokens,
        }
    }

    /// Pre-flight check against the per-request ceiling.
    ///
    /// Distinct from the tracker's post-hoc daily aggregation: a failed
    /// check means the message is never dispatched.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn validate_budget(&self, estimated_tokens: u32, max_per_request: u32) -> BudgetCheck {
        if estimated_tokens > max_per_request {
            BudgetCheck {
                is_valid: false,
                warning: Some(format!(
                    "Estimated {estimated_tokens} tokens exceeds the per-request ceiling of {max_per_request}"
                )),
            }
        } else {
            BudgetCheck {
                is_valid: true,
                warning: None,
            }
        }
    }

    /// Truncate a message at a word boundary.
    ///
    /// Returns the input unchanged when it fits. Otherwise cuts to at most
    /// `max_length` characters, backtracks to the last whitespace so no word
    /// is split, and appends an ellipsis. The result never exceeds
    /// `max_length` plus the one-character ellipsis.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn shorten_message(&self, message: &str, max_length: usize) -> String {
        if message.chars().count() <= max_length {
            return message.to_string();
        }

        let cut: String = message.chars().take(max_length).collect();
        let shortened = cut
            .rfind(char::is_whitespace)
            .map_or(cut.as_str(), |idx| &cut[..idx]);

        let mut result = shortened.trim_end().to_string();
        result.push(ELLIPSIS);
        result
    }
}

/// Render a measurement without a trailing `.0`
fn format_number(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}
