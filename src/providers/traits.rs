//! Outbound generation-service trait.
//!
//! A provider turns one [`Prompt`] into reply text. It reports failures with
//! distinguishable [`WelloError`](crate::WelloError) variants so the
//! [`GenerationClient`](crate::generation::GenerationClient) can tell
//! transient faults (timeout, rate limit, network, 5xx) from permanent ones
//! (auth, malformed request):
//!
//! | failure | variant |
//! |---|---|
//! | timeout | `Timeout` |
//! | rate limited | `RateLimited` |
//! | bad credentials | `AuthenticationFailed` |
//! | rejected request | `MalformedRequest` |
//! | unreadable reply body | `Json` |
//! | anything else | `Http` / `Api` / `EmptyResponse` |
//!
//! Providers make a single attempt; retry and the outer timeout live in the
//! generation client.

use async_trait::async_trait;

use crate::Result;
use crate::generation::CompletionParams;
use crate::prompt::Prompt;

/// Provider for text completion.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Complete a prompt, returning the reply text.
    async fn complete(&self, prompt: &Prompt, params: &CompletionParams) -> Result<String>;
}
