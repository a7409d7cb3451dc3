//! Port adapters
//!
//! Map the application-layer port contracts onto the Groq client.

mod groq_chat_adapter;
mod groq_vision_adapter;

pub use groq_chat_adapter::GroqChatAdapter;
pub use groq_vision_adapter::GroqVisionAdapter;
