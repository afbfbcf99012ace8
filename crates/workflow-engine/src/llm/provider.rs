//! LanguageModel trait and provider errors

use async_trait::async_trait;
use thiserror::Error;

/// Prompt-in, text-out model capability consumed by LLM vertices
///
/// Implementations own their transport, timeout and error taxonomy. They are
/// shared across vertices and executions, hence `Send + Sync`.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for `prompt`
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Model or provider name, for logs
    fn name(&self) -> &str;
}

/// Typed errors for language-model calls
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized - check API key")]
    Unauthorized,

    #[error("Rate limited - too many requests")]
    RateLimited,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("HTTP error ({0}): {1}")]
    HttpError(u16, String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Provider returned an empty response")]
    EmptyResponse,

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Whether the failure is transient from the provider's point of view
    ///
    /// The engine never retries; callers may use this to decide whether to
    /// resubmit an execution.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Timeout
                | ProviderError::Connection(_)
                | ProviderError::RateLimited
                | ProviderError::ServerError(..)
        )
    }
}
