//! Language-model provider abstraction.
//!
//! The completion endpoint is the one non-deterministic external
//! dependency, so it sits behind a narrow trait: prompt in, JSON-shaped
//! completion text out. Tests swap in the mock provider.

pub mod mock;
pub mod openrouter;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Worth retrying: transport hiccups and rate limits. Everything
    /// else reflects the request itself and will fail again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::NetworkError(_) | ProviderError::RateLimited
        )
    }
}

/// A hosted completion endpoint that can answer with a JSON object.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Request a JSON-object completion for the given prompt.
    async fn complete_json(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
