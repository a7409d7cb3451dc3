//! Composition root
//!
//! Assembles the assistant pipeline from configuration: the Groq client and
//! its port adapters, the response cache, the budget tracker, the request
//! coordinator, and the expression resolver. The weather source is supplied
//! by the hosting layer, which owns the forecast data it already renders.

use std::sync::Arc;

use ai_core::{GroqClient, LlmConfig};
use application::{
    error::ApplicationError,
    ports::WeatherSnapshotPort,
    services::{
        AssistantService, ExpressionResolver, ExpressionScorer, PipelineOptions,
        RequestCoordinator, TokenBudgetTracker,
    },
};
use tracing::info;

use crate::{
    adapters::{GroqChatAdapter, GroqVisionAdapter},
    cache::MemoryResponseCache,
    config::AppConfig,
};

/// Build a fully wired [`AssistantService`]
pub fn build_assistant(
    config: &AppConfig,
    weather: Arc<dyn WeatherSnapshotPort>,
) -> Result<AssistantService, ApplicationError> {
    let client = Arc::new(build_client(&config.llm)?);

    let scorer = ExpressionScorer::new();
    let resolver = if config.pipeline.vision_confirmation {
        ExpressionResolver::with_vision(
            scorer,
            Arc::new(GroqVisionAdapter::new(Arc::clone(&client))),
            config.pipeline.mascot_image_base_url.clone(),
        )
    } else {
        ExpressionResolver::new(scorer)
    };

    info!(
        debounce_ms = config.pipeline.debounce_ms,
        vision = config.pipeline.vision_confirmation,
        "Assembled assistant pipeline"
    );

    Ok(AssistantService::new(
        Arc::new(GroqChatAdapter::new(client)),
        weather,
        Arc::new(MemoryResponseCache::new()),
        Arc::new(TokenBudgetTracker::with_limit(
            config.pipeline.daily_token_limit,
        )),
        Arc::new(RequestCoordinator::with_intervals(
            config.pipeline.debounce(),
            config.pipeline.dedup_window(),
        )),
        resolver,
        PipelineOptions {
            max_tokens_per_request: config.pipeline.max_tokens_per_request,
            response_cache_ttl: config.pipeline.response_cache_ttl(),
            debounce: true,
        },
    ))
}

fn build_client(config: &LlmConfig) -> Result<GroqClient, ApplicationError> {
    GroqClient::new(config.clone()).map_err(|e| ApplicationError::Configuration(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoWeather;

    impl WeatherSnapshotPort for NoWeather {
        fn current(&self) -> Option<domain::WeatherSnapshot> {
            None
        }
    }

    #[test]
    fn default_config_builds_a_pipeline() {
        let service = build_assistant(&AppConfig::default(), Arc::new(NoWeather)).unwrap();
        assert_eq!(service.daily_usage().requests, 0);
        assert_eq!(service.cache_stats().entries, 0);
    }

    #[test]
    fn vision_enabled_config_builds_too() {
        let mut config = AppConfig::default();
        config.pipeline.vision_confirmation = true;
        let service = build_assistant(&config, Arc::new(NoWeather)).unwrap();
        assert_eq!(service.coordinator_stats().executions, 0);
    }
}
