//! Application layer - assistant pipeline orchestration
//!
//! Contains the chat orchestration services (prompt assembly, request
//! coalescing, token budgeting, expression resolution) and the port
//! definitions for the external capabilities they consume.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
