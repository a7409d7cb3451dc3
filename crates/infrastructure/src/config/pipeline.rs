//! Pipeline tuning configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for the assistant pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Trailing-edge debounce interval in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// How long a settled result short-circuits duplicates, in milliseconds
    #[serde(default = "default_dedup_window_ms")]
    pub dedup_window_ms: u64,

    /// TTL for cached responses in seconds (default: 6 hours)
    #[serde(default = "default_response_cache_ttl_secs")]
    pub response_cache_ttl_secs: u64,

    /// Daily token allowance
    #[serde(default = "default_daily_token_limit")]
    pub daily_token_limit: u64,

    /// Per-request estimated-token ceiling
    #[serde(default = "default_max_tokens_per_request")]
    pub max_tokens_per_request: u32,

    /// Confirm expression picks against mascot frames with the vision model
    #[serde(default)]
    pub vision_confirmation: bool,

    /// Base URL for per-expression mascot frames
    #[serde(default = "default_mascot_image_base_url")]
    pub mascot_image_base_url: String,
}

const fn default_debounce_ms() -> u64 {
    800
}

const fn default_dedup_window_ms() -> u64 {
    2_000
}

const fn default_response_cache_ttl_secs() -> u64 {
    6 * 60 * 60
}

const fn default_daily_token_limit() -> u64 {
    1_500_000
}

const fn default_max_tokens_per_request() -> u32 {
    8_000
}

fn default_mascot_image_base_url() -> String {
    "/mascot".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            dedup_window_ms: default_dedup_window_ms(),
            response_cache_ttl_secs: default_response_cache_ttl_secs(),
            daily_token_limit: default_daily_token_limit(),
            max_tokens_per_request: default_max_tokens_per_request(),
            vision_confirmation: false,
            mascot_image_base_url: default_mascot_image_base_url(),
        }
    }
}

impl PipelineConfig {
    /// Debounce interval as a Duration
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Dedup window as a Duration
    #[must_use]
    pub const fn dedup_window(&self) -> Duration {
        Duration::from_millis(self.dedup_window_ms)
    }

    /// Response cache TTL as a Duration
    #[must_use]
    pub const fn response_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.response_cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.debounce_ms, 800);
        assert_eq!(config.dedup_window_ms, 2_000);
        assert_eq!(config.response_cache_ttl_secs, 21_600);
        assert_eq!(config.daily_token_limit, 1_500_000);
        assert_eq!(config.max_tokens_per_request, 8_000);
        assert!(!config.vision_confirmation);
        assert_eq!(config.mascot_image_base_url, "/mascot");
    }

    #[test]
    fn duration_helpers() {
        let config = PipelineConfig::default();
        assert_eq!(config.debounce(), Duration::from_millis(800));
        assert_eq!(config.dedup_window(), Duration::from_secs(2));
        assert_eq!(config.response_cache_ttl(), Duration::from_secs(6 * 3600));
    }

    #[test]
    fn deserialize_applies_defaults_for_missing_fields() {
        let json = r#"{"debounce_ms":300,"vision_confirmation":true}"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.debounce_ms, 300);
        assert!(config.vision_confirmation);
        assert_eq!(config.dedup_window_ms, 2_000);
    }
}
