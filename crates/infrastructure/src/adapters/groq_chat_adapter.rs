//! Chat completion adapter over the Groq client

use std::sync::Arc;

use ai_core::{ChatMessage, GroqClient};
use application::{
    error::ApplicationError,
    ports::{ChatCompletionPort, ChatReply, ChatRole, ChatTurn},
};
use async_trait::async_trait;
use tracing::instrument;

/// [`ChatCompletionPort`] implementation backed by Groq
#[derive(Debug)]
pub struct GroqChatAdapter {
    client: Arc<GroqClient>,
}

impl GroqChatAdapter {
    pub const fn new(client: Arc<GroqClient>) -> Self {
        Self { client }
    }
}

fn to_message(turn: &ChatTurn) -> ChatMessage {
    match turn.role {
        ChatRole::User => ChatMessage::user(turn.content.clone()),
        ChatRole::Assistant => ChatMessage::assistant(turn.content.clone()),
    }
}

#[async_trait]
impl ChatCompletionPort for GroqChatAdapter {
    #[instrument(skip_all)]
    async fn send_chat(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        history: &[ChatTurn],
    ) -> Result<ChatReply, ApplicationError> {
        let history: Vec<ChatMessage> = history.iter().map(to_message).collect();

        let response = self
            .client
            .chat_completion(system_prompt, user_prompt, &history)
            .await
            .map_err(|e| ApplicationError::ChatCall(e.to_string()))?;

        Ok(ChatReply {
            content: response.content,
            model: response.model,
            tokens_used: response.usage.map(|u| u.total_tokens),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_roles_map_onto_wire_roles() {
        let user = to_message(&ChatTurn::user("q"));
        assert_eq!(user.role, "user");

        let assistant = to_message(&ChatTurn::assistant("a"));
        assert_eq!(assistant.role, "assistant");
    }
}
