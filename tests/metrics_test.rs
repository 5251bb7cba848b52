//! Tests for the metrics collector and facade emission.
//!
//! Facade assertions use `metrics_util::debugging::DebuggingRecorder` to
//! capture emitted metrics without a real exporter.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use wello::telemetry;
use wello::{
    CompletionParams, CompletionProvider, FailureCause, GenerationClient, MetricsCollector,
    Prompt, PromptBuilder, QueryClass, Result, RetryConfig, WelloError,
};

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// ============================================================================
// Collector
// ============================================================================

#[test]
fn test_empty_snapshot_is_all_zero() {
    let snapshot = MetricsCollector::new().snapshot();
    assert_eq!(snapshot.total_requests, 0);
    assert_eq!(snapshot.avg_request_time, 0.0);
    assert_eq!(snapshot.median_request_time, 0.0);
    assert_eq!(snapshot.cache_hit_rate, 0.0);
}

#[test]
fn test_hit_rate() {
    let collector = MetricsCollector::new();
    for _ in 0..3 {
        collector.record_cache_miss();
    }
    for _ in 0..7 {
        collector.record_cache_hit();
    }

    let snapshot = collector.snapshot();
    assert_eq!(snapshot.cache_hits, 7);
    assert_eq!(snapshot.cache_misses, 3);
    assert!((snapshot.cache_hit_rate - 0.7).abs() < 1e-9);
}

#[test]
fn test_window_statistics() {
    let collector = MetricsCollector::new();
    for n in [40, 10, 30, 20] {
        collector.record_request(ms(n));
    }

    let snapshot = collector.snapshot();
    assert_eq!(snapshot.total_requests, 4);
    assert!((snapshot.avg_request_time - 0.025).abs() < 1e-9);
    assert!((snapshot.min_request_time - 0.010).abs() < 1e-9);
    assert!((snapshot.max_request_time - 0.040).abs() < 1e-9);
    assert!((snapshot.median_request_time - 0.025).abs() < 1e-9);
}

#[test]
fn test_window_drops_oldest_samples() {
    let collector = MetricsCollector::new();
    // 100 slow samples, then 100 fast ones push them all out.
    for _ in 0..100 {
        collector.record_request(ms(1000));
    }
    for _ in 0..100 {
        collector.record_request(ms(10));
    }

    let snapshot = collector.snapshot();
    assert_eq!(snapshot.total_requests, 200);
    assert!((snapshot.max_request_time - 0.010).abs() < 1e-9);
    assert!((snapshot.avg_request_time - 0.010).abs() < 1e-9);
}

#[test]
fn test_custom_window_size() {
    let collector = MetricsCollector::with_window(2);
    collector.record_request(ms(100));
    collector.record_request(ms(200));
    collector.record_request(ms(300));

    let snapshot = collector.snapshot();
    assert!((snapshot.min_request_time - 0.200).abs() < 1e-9);
    assert!((snapshot.avg_request_time - 0.250).abs() < 1e-9);
}

#[test]
fn test_counts_api_calls_and_failures() {
    let collector = MetricsCollector::new();
    collector.record_api_call();
    collector.record_api_call();
    collector.record_generation_failure(FailureCause::Rejected);

    let snapshot = collector.snapshot();
    assert_eq!(snapshot.api_calls, 2);
    assert_eq!(snapshot.generation_failures, 1);
}

#[test]
fn test_snapshot_serializes_field_names() {
    let collector = MetricsCollector::new();
    collector.record_cache_hit();
    let json = serde_json::to_value(collector.snapshot()).unwrap();

    assert_eq!(json["cache_hits"], 1);
    assert_eq!(json["cache_hit_rate"], 1.0);
    assert!(json.get("avg_request_time").is_some());
    assert!(json.get("api_calls").is_some());
}

#[test]
fn test_concurrent_recording() {
    let collector = Arc::new(MetricsCollector::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let collector = Arc::clone(&collector);
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    collector.record_cache_hit();
                    collector.record_request(ms(1));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = collector.snapshot();
    assert_eq!(snapshot.cache_hits, 8000);
    assert_eq!(snapshot.total_requests, 8000);
}

// ============================================================================
// Facade emission
// ============================================================================

#[test]
fn test_collector_emits_facade_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let collector = MetricsCollector::new();
        collector.record_cache_hit();
        collector.record_cache_miss();
        collector.record_cache_miss();
        collector.record_api_call();
        collector.record_generation_failure(FailureCause::Unavailable);
        collector.record_request(ms(5));
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL), 2);
    assert_eq!(counter_total(&snapshot, telemetry::API_CALLS_TOTAL), 1);
    assert_eq!(
        counter_total(&snapshot, telemetry::GENERATION_FAILURES_TOTAL),
        1
    );
    assert!(has_histogram(&snapshot, telemetry::REQUEST_DURATION_SECONDS));
}

struct AlwaysDown;

#[async_trait]
impl CompletionProvider for AlwaysDown {
    fn name(&self) -> &str {
        "down"
    }

    async fn complete(&self, _prompt: &Prompt, _params: &CompletionParams) -> Result<String> {
        Err(WelloError::Http("connection refused".into()))
    }
}

/// Runs async code within a local recorder scope on the multi-thread runtime.
///
/// `block_in_place` ensures the sync `with_local_recorder` closure stays
/// on the current thread while `block_on` drives the inner async work.
#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_retries_are_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let client = GenerationClient::new(
                    Arc::new(AlwaysDown),
                    CompletionParams::default(),
                    RetryConfig::new().initial_delay(ms(1)),
                );
                let prompt = PromptBuilder::new().build("마그네슘", QueryClass::Nutrient);
                client.generate(&prompt).await
            })
        })
    });
    assert!(result.is_err());

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::RETRIES_TOTAL), 2);
}
