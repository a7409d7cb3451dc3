//! In-memory response cache with per-entry TTL
//!
//! Entries carry their own expiry instant. Expiry is lazy: a read of an
//! expired entry evicts it and counts a miss; `cleanup` sweeps the whole map
//! for periodic maintenance. Uses the tokio clock so TTL behavior is
//! testable under paused time.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use application::{
    error::ApplicationError,
    ports::{CacheStats, ResponseCachePort},
};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Entry wrapper that includes its expiration instant
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory [`ResponseCachePort`] implementation
#[derive(Default)]
pub struct MemoryResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for MemoryResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryResponseCache")
            .field("entries", &self.entries.lock().len())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}

impl MemoryResponseCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key`, evicting it first when expired. Counts the hit/miss.
    fn lookup(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
            Some(_) => {
                // Lazy deletion of the expired entry.
                entries.remove(key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Cache entry expired");
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }
}

#[async_trait]
impl ResponseCachePort for MemoryResponseCache {
    #[instrument(skip(self), level = "debug")]
    async fn get(&self, key: &str) -> Result<Option<String>, ApplicationError> {
        Ok(self.lookup(key))
    }

    #[instrument(skip(self, value), level = "debug")]
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), ApplicationError> {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.lock().insert(key.to_string(), entry);
        Ok(())
    }

    async fn contains(&self, key: &str) -> Result<bool, ApplicationError> {
        Ok(self.lookup(key).is_some())
    }

    async fn remove(&self, key: &str) -> Result<(), ApplicationError> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), ApplicationError> {
        self.entries.lock().clear();
        Ok(())
    }

    async fn cleanup(&self) -> Result<u64, ApplicationError> {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        let removed = (before - entries.len()) as u64;
        if removed > 0 {
            debug!(removed = removed, "Cleaned up expired cache entries");
        }
        Ok(removed)
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.lock().len() as u64,
        }
    }
}
