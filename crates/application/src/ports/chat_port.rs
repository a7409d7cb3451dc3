//! Chat completion port
//!
//! The opaque "send a chat message" capability. The pipeline does not define
//! the wire format; adapters in the infrastructure layer map this contract
//! onto a concrete provider (Groq, OpenRouter, ...).

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Role of a prior conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Message authored by the user
    User,
    /// Message authored by the assistant
    Assistant,
}

/// One prior turn of conversation history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    /// Convenience constructor for a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Convenience constructor for an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Successful chat completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    /// Generated response text
    pub content: String,
    /// Model that produced the response
    pub model: String,
    /// Provider-reported token usage, when available
    pub tokens_used: Option<u32>,
}

/// Port for the chat completion capability
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChatCompletionPort: Send + Sync {
    /// Send one chat message with optional history.
    ///
    /// Failures map to [`ApplicationError::ChatCall`] and are surfaced to
    /// the caller with a retry affordance; the pipeline performs no
    /// automatic retry.
    async fn send_chat(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        history: &[ChatTurn],
    ) -> Result<ChatReply, ApplicationError>;
}
