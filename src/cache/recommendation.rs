//! In-memory recommendation cache.
//!
//! [`RecommendationCache`] maps a [`NormalizedKey`] to generated text. Each
//! entry records its creation instant and TTL; a lookup only succeeds while
//! `now - created_at < ttl`. moka bounds the entry count (LRU-ish
//! TinyLFU eviction) and expires entries in the background using the same
//! per-entry TTL, so an unbounded flood of unique queries cannot grow the
//! process without limit.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use tracing::debug;

use super::CacheBackend;
use super::clock::{Clock, SystemClock};
use crate::Result;
use crate::query::NormalizedKey;

/// Configuration for the recommendation cache.
///
/// ```rust
/// # use wello::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(2_000)
///     .ttl(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 5,000.
    pub max_entries: u64,
    /// Default time-to-live for entries. Default: 300 seconds.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 5_000,
            ttl: Duration::from_secs(300),
        }
    }
}

impl CacheConfig {
    /// Create a new config with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the default time-to-live.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

#[derive(Debug)]
struct CacheEntry {
    text: String,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) < self.ttl
    }
}

/// Per-entry expiry for moka; replacement restarts the TTL.
struct EntryExpiry;

impl Expiry<NormalizedKey, Arc<CacheEntry>> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &NormalizedKey,
        value: &Arc<CacheEntry>,
        _created_at: std::time::Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &NormalizedKey,
        value: &Arc<CacheEntry>,
        _updated_at: std::time::Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Bounded TTL cache of generated recommendations.
pub struct RecommendationCache {
    entries: Cache<NormalizedKey, Arc<CacheEntry>>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

impl RecommendationCache {
    /// Create a cache driven by the system clock.
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a cache that judges freshness against `clock`.
    pub fn with_clock(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_entries)
            .expire_after(EntryExpiry)
            .build();
        Self {
            entries,
            clock,
            default_ttl: config.ttl,
        }
    }

    /// The TTL applied by [`insert`](Self::insert).
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Look up a live entry.
    ///
    /// An entry whose age has reached its TTL is treated as a miss and
    /// evicted.
    pub async fn get(&self, key: &NormalizedKey) -> Option<String> {
        let entry = self.entries.get(key).await?;
        if entry.is_live(self.clock.now()) {
            return Some(entry.text.clone());
        }
        self.evict_stale(key, &entry).await;
        None
    }

    /// Remove `stale` unless a concurrent write has already replaced it.
    async fn evict_stale(&self, key: &NormalizedKey, stale: &Arc<CacheEntry>) {
        let result = self
            .entries
            .entry(key.clone())
            .and_compute_with(|current| {
                let op = match current {
                    Some(current) if Arc::ptr_eq(current.value(), stale) => Op::Remove,
                    _ => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;
        if matches!(result, CompResult::Removed(_)) {
            debug!(key = %key, "evicted expired entry");
        }
    }

    /// Insert or replace an entry with an explicit TTL.
    pub async fn set(&self, key: NormalizedKey, text: impl Into<String>, ttl: Duration) {
        let entry = CacheEntry {
            text: text.into(),
            created_at: self.clock.now(),
            ttl,
        };
        self.entries.insert(key, Arc::new(entry)).await;
    }

    /// Insert or replace an entry with the default TTL.
    pub async fn insert(&self, key: NormalizedKey, text: impl Into<String>) {
        self.set(key, text, self.default_ttl).await;
    }

    /// Drop the entry for `key`, if any.
    pub async fn invalidate(&self, key: &NormalizedKey) {
        self.entries.invalidate(key).await;
    }

    /// Number of entries held, after flushing moka's pending maintenance.
    ///
    /// May include expired entries that have not been swept yet.
    pub async fn len(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Evict all entries.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}

impl Default for RecommendationCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

#[async_trait]
impl CacheBackend for RecommendationCache {
    async fn get(&self, key: &NormalizedKey) -> Option<String> {
        RecommendationCache::get(self, key).await
    }

    async fn set(&self, key: &NormalizedKey, text: &str, ttl: Duration) -> Result<()> {
        RecommendationCache::set(self, key.clone(), text, ttl).await;
        Ok(())
    }
}
