//! Telemetry metric name constants.
//!
//! Centralised metric names for wello operations. Consumers install their
//! own `metrics` recorder (e.g. prometheus, statsd); without a recorder
//! installed, all metric calls are no-ops. The in-process
//! [`MetricsCollector`](crate::stats::MetricsCollector) keeps its own
//! counters for the snapshot accessor regardless.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `wello_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `outcome`: "cached", "generated" or "failed"
//! - `provider`: provider name (e.g. "openai")
//! - `cause`: "unavailable" or "rejected"

/// Total recommendation requests (blank queries excluded).
///
/// Labels: `outcome`.
pub const REQUESTS_TOTAL: &str = "wello_requests_total";

/// End-to-end request duration in seconds.
pub const REQUEST_DURATION_SECONDS: &str = "wello_request_duration_seconds";

/// Total cache hits.
pub const CACHE_HITS_TOTAL: &str = "wello_cache_hits_total";

/// Total cache misses.
pub const CACHE_MISSES_TOTAL: &str = "wello_cache_misses_total";

/// Total calls into the generation service (retries not counted).
pub const API_CALLS_TOTAL: &str = "wello_api_calls_total";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `provider`.
pub const RETRIES_TOTAL: &str = "wello_retries_total";

/// Total generation calls that ended in failure.
///
/// Labels: `cause`.
pub const GENERATION_FAILURES_TOTAL: &str = "wello_generation_failures_total";

/// Total cache writes that the backend failed to store.
pub const CACHE_STORE_FAILURES_TOTAL: &str = "wello_cache_store_failures_total";
