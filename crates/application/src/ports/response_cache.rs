//! Response cache port
//!
//! Time-windowed key/value store for LLM responses. Weather-grounded answers
//! stay valid for hours, so the default TTL is long. Expiry is lazy: an
//! expired entry is evicted the first time it is read, and `cleanup` exists
//! for periodic proactive sweeps.

use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Default TTL for cached responses (6 hours)
pub const DEFAULT_RESPONSE_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Port for the response cache
///
/// Every `get`/`contains` counts a hit or a miss. A cache miss is normal
/// control flow, not an error.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResponseCachePort: Send + Sync {
    /// Get a cached response, evicting it first if its TTL has elapsed
    async fn get(&self, key: &str) -> Result<Option<String>, ApplicationError>;

    /// Store a response, overwriting any existing entry for `key`
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), ApplicationError>;

    /// Freshness check with the same lazy-eviction behavior as `get`
    async fn contains(&self, key: &str) -> Result<bool, ApplicationError>;

    /// Explicitly invalidate a single entry
    async fn remove(&self, key: &str) -> Result<(), ApplicationError>;

    /// Drop all entries
    async fn clear(&self) -> Result<(), ApplicationError>;

    /// Sweep all entries, evicting everything expired; returns the count
    /// evicted. Intended to be called periodically to bound memory.
    async fn cleanup(&self) -> Result<u64, ApplicationError>;

    /// Hit/miss/size statistics. `entries` includes expired-but-unread
    /// entries until they are lazily evicted.
    fn stats(&self) -> CacheStats;
}

/// Cache statistics for the debug panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Current number of stored entries
    pub entries: u64,
}

impl CacheStats {
    /// Total lookups observed
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.hits + self.misses
    }

    /// Hit rate as a percentage (0.0 - 100.0); 0 when nothing was looked up
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // statistics display only
    pub fn hit_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
        }
    }
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} hits / {} misses ({:.1}%), {} entries",
            self.hits,
            self.misses,
            self.hit_rate(),
            self.entries
        )
    }
}
