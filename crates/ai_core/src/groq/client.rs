//! Groq chat/vision completion client

use std::time::Duration;

use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::LlmConfig;
use crate::error::LlmError;

/// One message in an OpenAI-format conversation
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: MessageContent::Text(content.into()),
        }
    }

    /// User message combining a text prompt with attached images
    pub fn user_with_images(prompt: impl Into<String>, image_urls: &[String]) -> Self {
        let mut parts = vec![ContentPart::Text {
            text: prompt.into(),
        }];
        parts.extend(image_urls.iter().map(|url| ContentPart::ImageUrl {
            image_url: ImageUrl { url: url.clone() },
        }));
        Self {
            role: "user".to_string(),
            content: MessageContent::Parts(parts),
        }
    }
}

/// Message content: plain text, or multi-part for vision requests
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One part of a multi-part message
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Token usage as reported by the provider
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A completed chat or vision response
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Serialize)]
struct CompletionRequestBody {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponseBody {
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Client for an OpenAI-compatible completion API
#[derive(Debug)]
pub struct GroqClient {
    client: Client,
    config: LlmConfig,
}

impl GroqClient {
    /// Create a new client from config
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| LlmError::ConnectionFailed(e.to_string()))?;

        info!(
            base_url = %config.base_url,
            chat_model = %config.chat_model,
            vision_model = %config.vision_model,
            "Initialized LLM client"
        );

        Ok(Self { client, config })
    }

    /// Plain chat completion against the configured chat model
    #[instrument(skip(self, system_prompt, user_prompt, history))]
    pub async fn chat_completion(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        history: &[ChatMessage],
    ) -> Result<CompletionResponse, LlmError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(user_prompt));

        self.complete(self.config.chat_model.clone(), messages).await
    }

    /// Vision completion: one text prompt plus candidate images, against the
    /// configured vision model
    #[instrument(skip(self, prompt, image_urls), fields(images = image_urls.len()))]
    pub async fn vision_completion(
        &self,
        prompt: &str,
        image_urls: &[String],
    ) -> Result<CompletionResponse, LlmError> {
        let messages = vec![ChatMessage::user_with_images(prompt, image_urls)];
        self.complete(self.config.vision_model.clone(), messages)
            .await
    }

    async fn complete(
        &self,
        model: String,
        messages: Vec<ChatMessage>,
    ) -> Result<CompletionResponse, LlmError> {
        let body = CompletionRequestBody {
            model,
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!(model = %body.model, "Sending completion request");

        let response = self
            .client
            .post(self.api_url("chat/completions"))
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Provider rate limit hit");
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "Completion request failed");
            return Err(LlmError::ServerError(format!("Status {status}: {text}")));
        }

        let parsed: CompletionResponseBody = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("no choices in response".to_string()))?;

        debug!(
            model = %parsed.model,
            usage = ?parsed.usage,
            "Completion received"
        );

        Ok(CompletionResponse {
            content: choice.message.content,
            model: parsed.model,
            usage: parsed.usage,
        })
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_joins_cleanly() {
        let client = GroqClient::new(LlmConfig::default()).unwrap();
        assert_eq!(
            client.api_url("chat/completions"),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(
            client.api_url("/chat/completions"),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }

    #[test]
    fn text_message_serializes_as_string_content() {
        let message = ChatMessage::user("hello");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hello");
    }

    #[test]
    fn vision_message_serializes_as_parts() {
        let message = ChatMessage::user_with_images(
            "pick one",
            &["https://example.com/a.png".to_string()],
        );
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][1]["type"], "image_url");
        assert_eq!(
            json["content"][1]["image_url"]["url"],
            "https://example.com/a.png"
        );
    }
}
