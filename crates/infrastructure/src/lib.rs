//! Infrastructure layer - adapters and wiring
//!
//! Concrete implementations of the application ports (Groq-backed chat and
//! vision, the in-memory response cache), configuration loading, logging
//! setup, and the composition root that assembles the assistant pipeline.

pub mod adapters;
pub mod cache;
pub mod config;
pub mod telemetry;
pub mod wiring;

pub use adapters::{GroqChatAdapter, GroqVisionAdapter};
pub use cache::MemoryResponseCache;
pub use config::{AppConfig, PipelineConfig};
pub use telemetry::init_tracing;
pub use wiring::build_assistant;
