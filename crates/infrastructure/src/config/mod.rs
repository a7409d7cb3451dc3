//! Application configuration
//!
//! Loaded from an optional `config` file plus `KUMO_`-prefixed environment
//! variables; every field has a working default so a bare environment with
//! just `KUMO_LLM__API_KEY` starts up.

mod pipeline;

use ai_core::LlmConfig;
use serde::Deserialize;

pub use pipeline::PipelineConfig;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// LLM provider configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Pipeline tuning
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Emit logs as JSON instead of human-readable lines
    #[serde(default)]
    pub json_logs: bool,
}

impl AppConfig {
    /// Load configuration from environment and optional file
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(Self::env_source());

        builder.build()?.try_deserialize()
    }

    /// Environment overrides. Nested fields are addressed with a double
    /// underscore, e.g. `KUMO_LLM__API_KEY` or `KUMO_PIPELINE__DEBOUNCE_MS`;
    /// a single `_` separator would split field names like `api_key` too.
    fn env_source() -> config::Environment {
        config::Environment::with_prefix("KUMO")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_complete() {
        let config = AppConfig::default();
        assert_eq!(config.llm.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.pipeline.debounce_ms, 800);
        assert!(!config.json_logs);
    }

    #[test]
    fn deserialization_with_partial_sections() {
        let json = r#"{"pipeline":{"max_tokens_per_request":4000},"json_logs":true}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.pipeline.max_tokens_per_request, 4_000);
        assert!(config.json_logs);
        assert_eq!(config.llm.chat_model, "llama-3.3-70b-versatile");
    }

    #[test]
    fn env_overrides_reach_nested_fields() {
        use secrecy::ExposeSecret;

        let vars = std::collections::HashMap::from([
            ("KUMO_LLM__API_KEY".to_string(), "gsk_from_env".to_string()),
            ("KUMO_PIPELINE__DEBOUNCE_MS".to_string(), "300".to_string()),
            ("KUMO_JSON_LOGS".to_string(), "true".to_string()),
        ]);
        let config: AppConfig = config::Config::builder()
            .add_source(AppConfig::env_source().source(Some(vars)))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.llm.api_key.expose_secret(), "gsk_from_env");
        assert_eq!(config.pipeline.debounce_ms, 300);
        assert!(config.json_logs);
        // Untouched fields keep their defaults
        assert_eq!(config.pipeline.dedup_window_ms, 2_000);
    }

    #[test]
    fn config_has_debug_impl() {
        let debug = format!("{:?}", AppConfig::default());
        assert!(debug.contains("AppConfig"));
        assert!(debug.contains("pipeline"));
    }
}
