//! Domain layer for Kumo
//!
//! Contains the mascot expression catalog, weather value objects, and domain
//! errors. This layer has no async dependencies and defines the ubiquitous
//! language for the assistant pipeline.

pub mod catalog;
pub mod errors;
pub mod expression;
pub mod weather;

pub use catalog::{CATALOG, ExpressionRule, rule_for};
pub use errors::DomainError;
pub use expression::Expression;
pub use weather::WeatherSnapshot;
