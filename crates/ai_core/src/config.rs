//! Configuration for the LLM provider client

use secrecy::SecretString;
use serde::Deserialize;

/// Configuration for an OpenAI-compatible provider
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the provider API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key, kept out of logs and debug output
    #[serde(default = "default_api_key")]
    pub api_key: SecretString,

    /// Model used for chat completions
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model used for vision completions
    #[serde(default = "default_vision_model")]
    pub vision_model: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for sampling (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_api_key() -> SecretString {
    SecretString::from("")
}

fn default_chat_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_vision_model() -> String {
    "llama-3.2-90b-vision-preview".to_string()
}

const fn default_timeout_ms() -> u64 {
    30_000
}

const fn default_max_tokens() -> u32 {
    1024
}

const fn default_temperature() -> f32 {
    0.7
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: default_api_key(),
            chat_model: default_chat_model(),
            vision_model: default_vision_model(),
            timeout_ms: default_timeout_ms(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl LlmConfig {
    /// Config pointed at Groq with the given key
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            ..Self::default()
        }
    }
}
