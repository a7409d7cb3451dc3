//! AI Core - LLM provider client
//!
//! HTTP client for OpenAI-compatible chat completion APIs (Groq). Covers
//! plain chat completions and multi-image vision completions; the
//! application-facing port adapters live in the infrastructure layer.

pub mod config;
pub mod error;
pub mod groq;

pub use config::LlmConfig;
pub use error::LlmError;
pub use groq::{
    ChatMessage, CompletionResponse, ContentPart, GroqClient, MessageContent, TokenUsage,
};
