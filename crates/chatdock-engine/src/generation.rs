//! The generation service seam.
//!
//! The controller only knows that a prompt goes in and text (or an error)
//! comes out. [`crate::gemini::GeminiClient`] is the production
//! implementation; tests substitute scripted services.

use async_trait::async_trait;
use std::time::Duration;

/// Turns a prompt into a natural-language reply.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Generate a reply for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Why a generation request produced no usable reply.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Transport-level failure (DNS, TLS, connection reset, ...).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The prompt was rejected by the service's safety filters.
    #[error("prompt blocked: {0}")]
    Blocked(String),

    /// The service answered but produced no text.
    #[error("response contained no text")]
    EmptyResponse,

    /// No reply arrived within the configured limit.
    #[error("no reply within {}s", .0.as_secs())]
    Timeout(Duration),

    /// The task running the request panicked or was aborted.
    #[error("request task ended unexpectedly: {0}")]
    Interrupted(String),
}

/// Run `service.generate`, bounded by `limit` when one is set.
pub async fn generate_within(
    service: &dyn GenerationService,
    prompt: &str,
    limit: Option<Duration>,
) -> Result<String, GenerationError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, service.generate(prompt))
            .await
            .map_err(|_| GenerationError::Timeout(limit))?,
        None => service.generate(prompt).await,
    }
}
