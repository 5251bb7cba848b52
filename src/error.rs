//! Wello error types

use std::time::Duration;

use serde::Serialize;

/// Wello error types
#[derive(Debug, thiserror::Error)]
pub enum WelloError {
    // Input errors
    #[error("query is empty")]
    EmptyQuery,

    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    // Soft errors
    #[error("empty response from model")]
    EmptyResponse,

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Configuration errors
    #[error("no generation provider configured")]
    NoProvider,

    #[error("configuration error: {0}")]
    Configuration(String),

    /// The cache backend refused or failed to store an entry.
    ///
    /// Never fails a request; the service logs it and moves on.
    #[error("cache store failed: {0}")]
    CacheStore(String),

    /// Terminal generation failure, returned once retries are exhausted or a
    /// permanent error was hit. `source` is the last provider error.
    #[error("generation failed after {attempts} attempt(s): {source}")]
    GenerationFailed {
        attempts: u32,
        #[source]
        source: Box<WelloError>,
    },
}

/// Coarse failure category for observability.
///
/// Distinguishes an upstream that could not answer from one that refused
/// the request. Safe to expose; carries no upstream detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCause {
    /// Timeout, rate limit, network fault, 5xx, or unusable output.
    Unavailable,
    /// Authentication failure, malformed request, or other 4xx.
    Rejected,
}

impl FailureCause {
    /// Label used for metrics and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCause::Unavailable => "unavailable",
            FailureCause::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WelloError {
    /// Whether the error is worth retrying.
    ///
    /// Timeouts, rate limits, transport faults, 408 and 5xx responses are
    /// transient. Everything else fails fast.
    pub fn is_transient(&self) -> bool {
        match self {
            WelloError::Http(_) | WelloError::Timeout(_) | WelloError::RateLimited { .. } => true,
            WelloError::Api { status, .. } => *status == 408 || *status >= 500,
            _ => false,
        }
    }

    /// Provider-supplied back-off hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            WelloError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Map the error onto the coarse [`FailureCause`].
    pub fn cause(&self) -> FailureCause {
        match self {
            WelloError::GenerationFailed { source, .. } => source.cause(),
            WelloError::AuthenticationFailed
            | WelloError::MalformedRequest(_)
            | WelloError::EmptyQuery
            | WelloError::NoProvider
            | WelloError::Configuration(_) => FailureCause::Rejected,
            WelloError::Api { status, .. } if (400..500).contains(status) && *status != 408 => {
                FailureCause::Rejected
            }
            _ => FailureCause::Unavailable,
        }
    }
}

/// Result type alias for Wello operations
pub type Result<T> = std::result::Result<T, WelloError>;
