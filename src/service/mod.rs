//! Recommendation orchestration.
//!
//! A request moves through
//!
//! ```text
//! Normalizing ─► CacheLookup ─┬─► hit ─────────────────────────────────────────► Done
//!                             └─► miss ─► Classifying ─► PromptBuilding ─► Generating
//!                                                                           │
//!                                              Failed ◄── error ────────────┤
//!                                              Done   ◄── CacheStoring ◄── ok
//! ```
//!
//! Blank input stops at `Normalizing` and yields [`Recommendation::Empty`]
//! without touching the cache, the metrics, or the generation service.
//! Failed generations are never cached. A cache write error is logged and
//! the generated text is still returned.
//!
//! The miss path runs on a spawned task so a caller that goes away does not
//! abort a generation already in flight; its result still lands in the cache.

mod builder;

pub use builder::RecommendationServiceBuilder;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{Instrument, Span, debug, error, info, instrument, warn};

use crate::cache::CacheBackend;
use crate::classify::{
    Classification, ClassificationStrategy, Classifier, QueryClass, TIE_BREAK, parse_label,
};
use crate::Result;
use crate::config::Config;
use crate::error::FailureCause;
use crate::generation::GenerationClient;
use crate::prompt::{Prompt, PromptBuilder};
use crate::query::{NormalizedKey, normalize};
use crate::stats::{MetricsCollector, MetricsSnapshot};
use crate::telemetry;

/// Text shown in place of a recommendation when generation fails.
pub const FAILURE_MESSAGE: &str =
    "⚠️ 지금은 추천을 생성할 수 없습니다. 잠시 후 다시 시도해주세요.";

/// Outcome of a recommendation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recommendation {
    /// Served from the cache.
    Cached(String),
    /// Freshly generated (and cached, unless the store failed).
    Generated(String),
    /// The query was blank; nothing was attempted.
    Empty,
    /// Generation failed. Carries the category only, never upstream detail.
    Failed(FailureCause),
}

impl Recommendation {
    /// Recommendation text on success.
    pub fn text(&self) -> Option<&str> {
        match self {
            Recommendation::Cached(text) | Recommendation::Generated(text) => Some(text),
            Recommendation::Empty | Recommendation::Failed(_) => None,
        }
    }

    /// Text for the end user: the recommendation, nothing, or [`FAILURE_MESSAGE`].
    pub fn display_text(&self) -> &str {
        match self {
            Recommendation::Cached(text) | Recommendation::Generated(text) => text,
            Recommendation::Empty => "",
            Recommendation::Failed(_) => FAILURE_MESSAGE,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, Recommendation::Cached(_))
    }

    fn outcome(&self) -> &'static str {
        match self {
            Recommendation::Cached(_) => "cached",
            Recommendation::Generated(_) => "generated",
            Recommendation::Empty => "empty",
            Recommendation::Failed(_) => "failed",
        }
    }
}

/// Cached, classification-aware recommendation service.
///
/// Cheap to clone; clones share the cache, metrics and provider.
#[derive(Clone)]
pub struct RecommendationService {
    inner: Arc<Inner>,
}

struct Inner {
    cache: Arc<dyn CacheBackend>,
    metrics: Arc<MetricsCollector>,
    classifier: Classifier,
    prompts: PromptBuilder,
    generator: GenerationClient,
    strategy: ClassificationStrategy,
    ttl: Duration,
}

impl RecommendationService {
    /// Create a new builder.
    pub fn builder() -> RecommendationServiceBuilder {
        RecommendationServiceBuilder::new()
    }

    /// Production wiring: OpenAI client, in-memory cache and collector, all
    /// tuned from `config`.
    pub fn from_config(config: &Config, api_key: impl Into<String>) -> Result<Self> {
        RecommendationServiceBuilder::from_config(config)
            .openai(api_key)
            .build()
    }

    /// Answer a query, from cache when possible.
    ///
    /// Never fails: errors become [`Recommendation::Failed`] (or
    /// [`Recommendation::Empty`] for blank input).
    #[instrument(name = "wello.recommend", skip_all)]
    pub async fn get_recommendation(&self, query: &str) -> Recommendation {
        let Ok(key) = normalize(query) else {
            debug!("blank query ignored");
            return Recommendation::Empty;
        };

        let started = Instant::now();
        let result = match self.inner.cache.get(&key).await {
            Some(text) => {
                self.inner.metrics.record_cache_hit();
                debug!(key = %key, "cache hit");
                Recommendation::Cached(text)
            }
            None => {
                self.inner.metrics.record_cache_miss();
                debug!(key = %key, "cache miss");
                let inner = Arc::clone(&self.inner);
                let query = query.trim().to_string();
                let task = async move { inner.generate_and_store(key, &query).await };
                match tokio::spawn(task.instrument(Span::current())).await {
                    Ok(result) => result,
                    Err(e) => {
                        error!(error = %e, "generation task aborted");
                        self.inner
                            .metrics
                            .record_generation_failure(FailureCause::Unavailable);
                        Recommendation::Failed(FailureCause::Unavailable)
                    }
                }
            }
        };

        let elapsed = started.elapsed();
        self.inner.metrics.record_request(elapsed);
        metrics::counter!(telemetry::REQUESTS_TOTAL, "outcome" => result.outcome()).increment(1);
        info!(
            outcome = result.outcome(),
            elapsed_ms = elapsed.as_millis() as u64,
            "recommendation served"
        );
        result
    }

    /// Current service-health counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Strategy used for queries the dictionary cannot classify.
    pub fn strategy(&self) -> ClassificationStrategy {
        self.inner.strategy
    }

    /// TTL applied to newly generated entries.
    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }
}

impl Inner {
    async fn generate_and_store(&self, key: NormalizedKey, query: &str) -> Recommendation {
        let prompt = self.prepare_prompt(query).await;

        self.metrics.record_api_call();
        match self.generator.generate(&prompt).await {
            Ok(text) => {
                if let Err(e) = self.cache.set(&key, &text, self.ttl).await {
                    warn!(key = %key, error = %e, "failed to cache recommendation");
                    metrics::counter!(telemetry::CACHE_STORE_FAILURES_TOTAL).increment(1);
                }
                Recommendation::Generated(text)
            }
            Err(e) => {
                let cause = e.cause();
                self.metrics.record_generation_failure(cause);
                error!(key = %key, cause = %cause, error = %e, "generation failed");
                Recommendation::Failed(cause)
            }
        }
    }

    async fn prepare_prompt(&self, query: &str) -> Prompt {
        match self.classifier.classify(query) {
            Classification::Resolved(class) => {
                debug!(class = %class, "classified locally");
                self.prompts.build(query, class)
            }
            Classification::Unresolved => match self.strategy {
                ClassificationStrategy::Combined => {
                    debug!("unclassified, using self-selecting prompt");
                    self.prompts.build_self_selecting(query)
                }
                ClassificationStrategy::TwoCall => {
                    let class = self.request_label(query).await;
                    debug!(class = %class, "classified by label call");
                    self.prompts.build(query, class)
                }
            },
        }
    }

    /// Ask the generation service for a class label; any failure yields [`TIE_BREAK`].
    async fn request_label(&self, query: &str) -> QueryClass {
        self.metrics.record_api_call();
        match self.generator.generate(&self.prompts.build_label(query)).await {
            Ok(reply) => parse_label(&reply).unwrap_or_else(|| {
                warn!(reply = %reply, "unparsable class label, using tie-break");
                TIE_BREAK
            }),
            Err(e) => {
                warn!(error = %e, "label call failed, using tie-break");
                TIE_BREAK
            }
        }
    }
}
