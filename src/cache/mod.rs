//! Recommendation caching.
//!
//! - [`RecommendationCache`]: bounded, TTL-expiring in-memory store mapping
//!   a [`NormalizedKey`] to previously generated text. Backed by moka's LRU
//!   cache; freshness is judged against an injectable [`Clock`] so expiry can
//!   be simulated in tests.
//!
//! - [`CacheBackend`]: the seam the service talks to. The in-memory cache is
//!   the only shipped implementation; a shared backend (e.g. redis for several
//!   front-end processes) slots in by implementing the trait and handing it to
//!   [`RecommendationServiceBuilder::cache()`](crate::service::RecommendationServiceBuilder::cache).
//!
//! # Consistency
//!
//! Entries are immutable once stored. A regenerated value for the same key
//! replaces the old entry as a whole; readers see either the previous entry,
//! nothing, or the new entry. Expired entries are never served and are
//! evicted lazily on lookup (moka also sweeps them in the background).

pub mod clock;
pub mod recommendation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use recommendation::{CacheConfig, RecommendationCache};

use std::time::Duration;

use async_trait::async_trait;

use crate::Result;
use crate::query::NormalizedKey;

/// Storage seam for generated recommendations.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch a live entry. Expired or absent entries return `None`.
    async fn get(&self, key: &NormalizedKey) -> Option<String>;

    /// Insert or replace the entry for `key`, fresh for `ttl`.
    ///
    /// Errors are reported as [`WelloError::CacheStore`](crate::WelloError::CacheStore);
    /// the caller treats them as non-fatal.
    async fn set(&self, key: &NormalizedKey, text: &str, ttl: Duration) -> Result<()>;
}
