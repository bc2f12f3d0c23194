// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Prompting and parsing live in the domains that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseModelGateway)

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

// =============================================================================
// Model Gateway Trait (Infrastructure - local LLM completion service)
// =============================================================================

/// Failures talking to the model service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    /// The service did not answer any readiness check
    #[error("model service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The service is up but the model is missing and could not be pulled
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// Any other completion failure (non-2xx, timeout, decode)
    #[error("model request failed: {0}")]
    Request(String),
}

/// Per-call completion settings.
#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub system: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Overrides the gateway's default request timeout
    pub timeout: Option<Duration>,
}

impl CompletionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
pub trait BaseModelGateway: Send + Sync {
    /// Complete a prompt with the configured model (returns raw text response)
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, ModelError>;

    /// Check the service until it answers or the attempt budget runs out
    async fn ensure_ready(&self) -> Result<(), ModelError>;

    /// Make sure `name` is available locally, pulling it if needed
    async fn ensure_model(&self, name: &str) -> Result<(), ModelError>;

    /// Identifier of the model used by `complete`
    fn model_name(&self) -> &str;
}
