//! Wello - cached, classification-aware nutrition recommendations
//!
//! This crate turns a free-text health query (a symptom such as "탈모" or a
//! nutrient such as "비타민D") into a structured recommendation generated by
//! an LLM API. Repeated queries within a freshness window are served from a
//! bounded in-memory cache, and basic service-health metrics are kept for a
//! boundary layer to display.
//!
//! # Example
//!
//! ```rust,no_run
//! use wello::RecommendationService;
//!
//! #[tokio::main]
//! async fn main() -> wello::Result<()> {
//!     let service = RecommendationService::builder()
//!         .openai("sk-your-key")
//!         .build()?;
//!
//!     let recommendation = service.get_recommendation("비타민D").await;
//!     println!("{}", recommendation.display_text());
//!
//!     let stats = service.metrics();
//!     println!("hit rate: {:.0}%", stats.cache_hit_rate * 100.0);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod generation;
pub mod prompt;
pub mod providers;
pub mod query;
pub mod service;
pub mod stats;
pub mod telemetry;

// Re-export main types at crate root
pub use cache::{CacheBackend, CacheConfig, Clock, ManualClock, RecommendationCache, SystemClock};
pub use classify::{ClassificationStrategy, Classifier, QueryClass};
pub use config::{Config, Secrets};
pub use error::{FailureCause, Result, WelloError};
pub use generation::{CompletionParams, GenerationClient};
pub use prompt::{Prompt, PromptBuilder};
pub use providers::{CompletionProvider, OpenAiClient, RetryConfig};
pub use query::{NormalizedKey, normalize};
pub use service::{FAILURE_MESSAGE, Recommendation, RecommendationService, RecommendationServiceBuilder};
pub use stats::{MetricsCollector, MetricsSnapshot};
