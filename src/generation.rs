//! Generation client: one bounded, retried call to the generation service.
//!
//! Wraps a [`CompletionProvider`] with
//!
//! - a per-attempt timeout ([`CompletionParams::timeout`]) enforced with
//!   `tokio::time::timeout`, independent of the provider's own transport
//!   timeout;
//! - transient-only retry per [`RetryConfig`];
//! - translation of every terminal failure into
//!   [`WelloError::GenerationFailed`], whose [`cause()`](WelloError::cause)
//!   tells "service unavailable" from "service rejected request".

use std::sync::Arc;
use std::time::Duration;

use crate::prompt::Prompt;
use crate::providers::retry::with_retry;
use crate::providers::{CompletionProvider, RetryConfig};
use crate::{Result, WelloError};

/// Parameters sent with every completion.
///
/// ```rust
/// # use wello::CompletionParams;
/// # use std::time::Duration;
/// let params = CompletionParams::new()
///     .model("gpt-4o-mini")
///     .temperature(0.3)
///     .timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    /// Model identifier. Default: `gpt-3.5-turbo`.
    pub model: String,
    /// Sampling temperature. Default: 0.5.
    pub temperature: f32,
    /// Output-length cap in tokens. Default: 800.
    pub max_tokens: u32,
    /// Per-attempt timeout. Default: 30s.
    pub timeout: Duration,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.5,
            max_tokens: 800,
            timeout: Duration::from_secs(30),
        }
    }
}

impl CompletionParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Bounded, retrying front for a [`CompletionProvider`].
#[derive(Clone)]
pub struct GenerationClient {
    provider: Arc<dyn CompletionProvider>,
    params: CompletionParams,
    retry: RetryConfig,
}

impl GenerationClient {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        params: CompletionParams,
        retry: RetryConfig,
    ) -> Self {
        Self {
            provider,
            params,
            retry,
        }
    }

    pub fn params(&self) -> &CompletionParams {
        &self.params
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Name of the wrapped provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Generate text for `prompt`.
    ///
    /// Errors are always [`WelloError::GenerationFailed`].
    pub async fn generate(&self, prompt: &Prompt) -> Result<String> {
        let timeout = self.params.timeout;
        with_retry(&self.retry, self.provider.name(), || async move {
            tokio::time::timeout(timeout, self.provider.complete(prompt, &self.params))
                .await
                .unwrap_or(Err(WelloError::Timeout(timeout)))
        })
        .await
    }
}
