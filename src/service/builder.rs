//! Builder for configuring service instances

use std::sync::Arc;

use super::{Inner, RecommendationService};
use crate::cache::{CacheBackend, CacheConfig, RecommendationCache};
use crate::classify::{ClassificationStrategy, Classifier};
use crate::config::Config;
use crate::generation::{CompletionParams, GenerationClient};
use crate::prompt::PromptBuilder;
use crate::providers::openai::DEFAULT_BASE_URL;
use crate::providers::{CompletionProvider, OpenAiClient, RetryConfig};
use crate::stats::MetricsCollector;
use crate::{Result, WelloError};

/// Builder for [`RecommendationService`].
///
/// A provider is required: either an explicit [`CompletionProvider`] or an
/// OpenAI API key. Cache and metrics collector default to fresh in-memory
/// instances when not injected.
pub struct RecommendationServiceBuilder {
    provider: Option<Arc<dyn CompletionProvider>>,
    openai_key: Option<String>,
    base_url: Option<String>,
    cache: Option<Arc<dyn CacheBackend>>,
    cache_config: CacheConfig,
    metrics: Option<Arc<MetricsCollector>>,
    metrics_window: Option<usize>,
    params: CompletionParams,
    retry: RetryConfig,
    strategy: ClassificationStrategy,
    classifier: Classifier,
}

impl Default for RecommendationServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RecommendationServiceBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            openai_key: None,
            base_url: None,
            cache: None,
            cache_config: CacheConfig::default(),
            metrics: None,
            metrics_window: None,
            params: CompletionParams::default(),
            retry: RetryConfig::default(),
            strategy: ClassificationStrategy::default(),
            classifier: Classifier::default(),
        }
    }

    /// Start from a loaded [`Config`]. A provider or key must still be set.
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .base_url(config.generation.base_url.clone())
            .params(config.completion_params())
            .retry(config.retry_config())
            .cache_config(config.cache_config())
            .strategy(config.generation.strategy)
            .metrics_window(config.metrics.window)
    }

    /// Use an explicit completion provider (takes precedence over [`openai`](Self::openai)).
    pub fn provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Use the OpenAI chat completions API with this key.
    pub fn openai(mut self, api_key: impl Into<String>) -> Self {
        self.openai_key = Some(api_key.into());
        self
    }

    /// Override the OpenAI-compatible base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Inject a cache backend (e.g. one shared with other services).
    pub fn cache(mut self, cache: Arc<dyn CacheBackend>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Configure the default in-memory cache. The TTL also applies to an
    /// injected backend.
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Set the entry TTL.
    pub fn ttl(mut self, ttl: std::time::Duration) -> Self {
        self.cache_config.ttl = ttl;
        self
    }

    /// Inject a metrics collector.
    pub fn metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Window size for a collector created by the builder.
    pub fn metrics_window(mut self, window: usize) -> Self {
        self.metrics_window = Some(window);
        self
    }

    /// Set completion parameters.
    pub fn params(mut self, params: CompletionParams) -> Self {
        self.params = params;
        self
    }

    /// Set the retry policy.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set the strategy for queries the dictionary cannot classify.
    pub fn strategy(mut self, strategy: ClassificationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Replace the dictionary classifier.
    pub fn classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Build the service.
    ///
    /// Fails with [`WelloError::NoProvider`] when neither a provider nor an
    /// API key was supplied.
    pub fn build(self) -> Result<RecommendationService> {
        let provider: Arc<dyn CompletionProvider> = match (self.provider, self.openai_key) {
            (Some(provider), _) => provider,
            (None, Some(key)) => {
                let base_url = self
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
                Arc::new(OpenAiClient::with_base_url(
                    key,
                    base_url,
                    self.params.timeout,
                )?)
            }
            (None, None) => return Err(WelloError::NoProvider),
        };

        let ttl = self.cache_config.ttl;
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(RecommendationCache::new(&self.cache_config)));
        let metrics = self.metrics.unwrap_or_else(|| {
            Arc::new(match self.metrics_window {
                Some(window) => MetricsCollector::with_window(window),
                None => MetricsCollector::new(),
            })
        });

        Ok(RecommendationService {
            inner: Arc::new(Inner {
                cache,
                metrics,
                classifier: self.classifier,
                prompts: PromptBuilder::new(),
                generator: GenerationClient::new(provider, self.params, self.retry),
                strategy: self.strategy,
                ttl,
            }),
        })
    }
}
