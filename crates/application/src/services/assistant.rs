//! Assistant orchestration: the coarse-grained entry point of the pipeline
//!
//! One call runs the full path: prompt assembly, pre-flight budget check,
//! response cache lookup, coalesced dispatch through the request
//! coordinator, usage tracking, cache write-back, and expression resolution
//! on the response text. Cache failures are logged and bypassed; they never
//! interrupt a message.

use std::{sync::Arc, time::Duration};

use domain::{Expression, WeatherSnapshot};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{
        chat_port::{ChatCompletionPort, ChatReply},
        response_cache::{CacheStats, DEFAULT_RESPONSE_TTL, ResponseCachePort},
        weather_port::WeatherSnapshotPort,
    },
    services::{
        expression_resolver::ExpressionResolver,
        prompt_builder::{PromptBuilder, PromptPackage},
        request_coordinator::{CoordinatorOptions, CoordinatorStats, RequestCoordinator},
        token_budget::{DailyUsage, RemainingBudget, TokenBudgetTracker},
    },
};

/// Usage category under which chat dispatches are tracked
const CHAT_CATEGORY: &str = "chat";

/// Default per-request token ceiling
const DEFAULT_MAX_TOKENS_PER_REQUEST: u32 = 8_000;

/// Tunables for one assistant instance
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Per-request estimated-token ceiling enforced before dispatch
    pub max_tokens_per_request: u32,
    /// TTL for cached responses
    pub response_cache_ttl: Duration,
    /// Debounce bursts before dispatching (disable for tests and CLIs)
    pub debounce: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_tokens_per_request: DEFAULT_MAX_TOKENS_PER_REQUEST,
            response_cache_ttl: DEFAULT_RESPONSE_TTL,
            debounce: true,
        }
    }
}

/// The assistant's answer plus the mascot expression to show with it
#[derive(Debug, Clone)]
pub struct AssistantReply {
    pub response_text: String,
    pub expression: Expression,
    /// Resolver confidence in `0.5..=1.0`
    pub confidence: f64,
}

/// Coarse-grained facade over the whole mascot pipeline
pub struct AssistantService {
    prompt_builder: PromptBuilder,
    chat: Arc<dyn ChatCompletionPort>,
    weather: Arc<dyn WeatherSnapshotPort>,
    cache: Arc<dyn ResponseCachePort>,
    tracker: Arc<TokenBudgetTracker>,
    coordinator: Arc<RequestCoordinator<ChatReply>>,
    resolver: ExpressionResolver,
    options: PipelineOptions,
}

impl std::fmt::Debug for AssistantService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantService")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl AssistantService {
    pub fn new(
        chat: Arc<dyn ChatCompletionPort>,
        weather: Arc<dyn WeatherSnapshotPort>,
        cache: Arc<dyn ResponseCachePort>,
        tracker: Arc<TokenBudgetTracker>,
        coordinator: Arc<RequestCoordinator<ChatReply>>,
        resolver: ExpressionResolver,
        options: PipelineOptions,
    ) -> Self {
        Self {
            prompt_builder: PromptBuilder::new(),
            chat,
            weather,
            cache,
            tracker,
            coordinator,
            resolver,
            options,
        }
    }

    /// Send one user message through the pipeline.
    ///
    /// Identical messages under identical weather share one cache key, so
    /// repeats inside the TTL answer without any provider call. Budget
    /// rejections happen before anything is dispatched.
    #[instrument(skip(self, message), fields(message_len = message.len()))]
    pub async fn send_message(&self, message: &str) -> Result<AssistantReply, ApplicationError> {
        let snapshot = self.weather.current();
        let package = self.prompt_builder.build_package(message, snapshot.as_ref());

        let check = self
            .prompt_builder
            .validate_budget(package.estimated_tokens, self.options.max_tokens_per_request);
        if !check.is_valid {
            let warning = check.warning.unwrap_or_else(|| "over budget".to_string());
            warn!(estimated = package.estimated_tokens, "{warning}");
            return Err(ApplicationError::BudgetExceeded(warning));
        }

        let key = response_key(message, snapshot.as_ref());

        let response_text = match self.cache.get(&key).await {
            Ok(Some(cached)) => {
                debug!(key = %key, "Response served from cache");
                cached
            }
            Ok(None) => self.dispatch(&key, &package).await?,
            Err(error) => {
                // A broken cache must not take the assistant down with it.
                warn!(%error, "Response cache lookup failed, dispatching anyway");
                self.dispatch(&key, &package).await?
            }
        };

        let resolution = self.resolver.resolve(&response_text).await;
        info!(
            expression = resolution.expression.name(),
            confidence = resolution.confidence,
            "Message resolved"
        );

        Ok(AssistantReply {
            response_text,
            expression: resolution.expression,
            confidence: resolution.confidence,
        })
    }

    /// Cancel any debounce timer still pending for `message` under the
    /// current weather (or all timers when `message` is `None`)
    pub fn flush(&self, message: Option<&str>) {
        match message {
            Some(message) => {
                let key = response_key(message, self.weather.current().as_ref());
                self.coordinator.flush(Some(&key));
            }
            None => self.coordinator.flush(None),
        }
    }

    /// Today's aggregate token usage
    #[must_use]
    pub fn daily_usage(&self) -> DailyUsage {
        self.tracker.daily_usage()
    }

    /// What is left of today's token allowance
    #[must_use]
    pub fn remaining_budget(&self) -> RemainingBudget {
        self.tracker.remaining()
    }

    /// Response cache hit/miss counters
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Request coordinator counters
    #[must_use]
    pub fn coordinator_stats(&self) -> CoordinatorStats {
        self.coordinator.stats()
    }

    /// Coalesced dispatch to the chat provider, then track usage and write
    /// the cache back. Both post-steps are advisory.
    async fn dispatch(&self, key: &str, package: &PromptPackage) -> Result<String, ApplicationError> {
        let chat = Arc::clone(&self.chat);
        let system_prompt = package.system_prompt.clone();
        let user_prompt = package.user_prompt.clone();

        let reply = self
            .coordinator
            .execute(
                key,
                move || async move { chat.send_chat(&system_prompt, &user_prompt, &[]).await },
                CoordinatorOptions {
                    debounce: self.options.debounce,
                    dedup_window: None,
                },
            )
            .await?;

        self.tracker
            .track_usage(u64::from(package.estimated_tokens), CHAT_CATEGORY);

        if let Err(error) = self
            .cache
            .set(key, reply.content.clone(), self.options.response_cache_ttl)
            .await
        {
            warn!(%error, "Failed to cache response");
        }

        Ok(reply.content)
    }
}

/// Cache/dedup key: normalized message plus the weather fields that change
/// the answer (temperature and condition). Humidity, wind, and precipitation
/// rarely alter advice enough to justify a cache split.
fn response_key(message: &str, snapshot: Option<&WeatherSnapshot>) -> String {
    let normalized = message
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let temperature = snapshot
        .and_then(|s| s.temperature)
        .map_or_else(|| "-".to_string(), |t| format!("{t:.1}"));
    let condition = snapshot
        .and_then(|s| s.condition.as_deref())
        .map_or_else(|| "-".to_string(), str::to_lowercase);

    format!("{normalized}|{temperature}|{condition}")
}
