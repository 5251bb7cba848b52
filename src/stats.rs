//! In-process service-health metrics.
//!
//! [`MetricsCollector`] keeps exact counters and a rolling window of recent
//! request durations for the [`snapshot()`](MetricsCollector::snapshot)
//! accessor. Every recording is mirrored to the `metrics` facade under the
//! names in [`telemetry`](crate::telemetry).

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

use crate::error::FailureCause;
use crate::telemetry;

/// Default number of duration samples retained.
pub const DEFAULT_WINDOW: usize = 100;

/// Point-in-time view of the collector.
///
/// Durations are in seconds; all timing fields are `0.0` when no request has
/// been recorded yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub avg_request_time: f64,
    pub min_request_time: f64,
    pub max_request_time: f64,
    pub median_request_time: f64,
    pub total_requests: u64,
    pub api_calls: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub generation_failures: u64,
    /// `hits / (hits + misses)`, or `0.0` before any lookup.
    pub cache_hit_rate: f64,
}

/// Thread-safe request/cache/API counters.
#[derive(Debug)]
pub struct MetricsCollector {
    total_requests: AtomicU64,
    api_calls: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    generation_failures: AtomicU64,
    window: Mutex<VecDeque<Duration>>,
    window_size: usize,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    /// Collector keeping the last [`DEFAULT_WINDOW`] durations.
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }

    /// Collector keeping the last `window_size` durations (at least one).
    pub fn with_window(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            total_requests: AtomicU64::new(0),
            api_calls: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            generation_failures: AtomicU64::new(0),
            window: Mutex::new(VecDeque::with_capacity(window_size)),
            window_size,
        }
    }

    /// Record a completed request. Oldest samples drop out first.
    pub fn record_request(&self, duration: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        {
            let mut window = self.window.lock().unwrap_or_else(|e| e.into_inner());
            if window.len() == self.window_size {
                window.pop_front();
            }
            window.push_back(duration);
        }
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS).record(duration.as_secs_f64());
    }

    pub fn record_api_call(&self) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(telemetry::API_CALLS_TOTAL).increment(1);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
    }

    pub fn record_generation_failure(&self, cause: FailureCause) {
        self.generation_failures.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(telemetry::GENERATION_FAILURES_TOTAL, "cause" => cause.as_str())
            .increment(1);
    }

    /// Current counters and window statistics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut samples: Vec<f64> = {
            let window = self.window.lock().unwrap_or_else(|e| e.into_inner());
            window.iter().map(Duration::as_secs_f64).collect()
        };
        samples.sort_by(f64::total_cmp);

        let hits = self.cache_hits.load(Ordering::Relaxed);
        let misses = self.cache_misses.load(Ordering::Relaxed);
        let cache_hit_rate = if hits + misses == 0 {
            0.0
        } else {
            hits as f64 / (hits + misses) as f64
        };

        MetricsSnapshot {
            avg_request_time: mean(&samples),
            min_request_time: samples.first().copied().unwrap_or(0.0),
            max_request_time: samples.last().copied().unwrap_or(0.0),
            median_request_time: median(&samples),
            total_requests: self.total_requests.load(Ordering::Relaxed),
            api_calls: self.api_calls.load(Ordering::Relaxed),
            cache_hits: hits,
            cache_misses: misses,
            generation_failures: self.generation_failures.load(Ordering::Relaxed),
            cache_hit_rate,
        }
    }
}

fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Median of an already sorted slice.
fn median(sorted: &[f64]) -> f64 {
    match sorted.len() {
        0 => 0.0,
        n if n % 2 == 1 => sorted[n / 2],
        n => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    }
}
