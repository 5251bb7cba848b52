//! Generation-service providers.
//!
//! [`CompletionProvider`] is the outbound seam; [`OpenAiClient`] is the
//! production implementation. [`retry`] holds the retry policy applied by
//! the [`GenerationClient`](crate::generation::GenerationClient).

pub mod openai;
pub mod retry;
pub mod traits;

pub use openai::OpenAiClient;
pub use retry::RetryConfig;
pub use traits::CompletionProvider;
