//! Groq OpenAI-compatible client

mod client;

pub use client::{
    ChatMessage, CompletionResponse, ContentPart, GroqClient, MessageContent, TokenUsage,
};
