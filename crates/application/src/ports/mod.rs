//! Port definitions
//!
//! Interfaces for the external capabilities the pipeline consumes: the chat
//! completion model, the optional vision confirmation model, the response
//! cache, and the weather snapshot supplied by the hosting UI.

pub mod chat_port;
pub mod response_cache;
pub mod vision_port;
pub mod weather_port;

pub use chat_port::{ChatCompletionPort, ChatReply, ChatRole, ChatTurn};
pub use response_cache::{CacheStats, DEFAULT_RESPONSE_TTL, ResponseCachePort};
pub use vision_port::{ExpressionCandidateImage, VisionPort, VisionVerdict};
pub use weather_port::WeatherSnapshotPort;
