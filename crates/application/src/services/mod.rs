//! Application services
//!
//! The orchestration pipeline: prompt assembly, token budgeting, request
//! coalescing, expression scoring/resolution, and the coarse-grained
//! assistant entry point that wires them together.

pub mod assistant;
pub mod expression_resolver;
pub mod expression_scorer;
pub mod prompt_builder;
pub mod request_coordinator;
pub mod token_budget;
pub mod variety;

pub use assistant::{AssistantReply, AssistantService, PipelineOptions};
pub use expression_resolver::{ExpressionResolver, Resolution};
pub use expression_scorer::{ContentFlags, ExpressionScorer, ScoredCandidate};
pub use prompt_builder::{BudgetCheck, PromptBuilder, PromptPackage};
pub use request_coordinator::{CoordinatorOptions, CoordinatorStats, RequestCoordinator};
pub use token_budget::{DailyUsage, RemainingBudget, TokenBudgetTracker, UsageStatus};
pub use variety::VarietyPolicy;
