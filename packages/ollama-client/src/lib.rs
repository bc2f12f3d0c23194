//! Pure Ollama REST API client
//!
//! A small client for a local Ollama server with no domain-specific logic.
//! Supports chat completions, raw generation, model listing, and model pulls.
//!
//! # Example
//!
//! ```rust,ignore
//! use ollama_client::{OllamaClient, ChatRequest, Message};
//!
//! let client = OllamaClient::new("http://localhost:11434");
//!
//! client.ping().await?;
//! if !client.has_model("llama3").await? {
//!     client.pull_model("llama3").await?;
//! }
//!
//! let response = client.chat_completion(
//!     ChatRequest::new("llama3").message(Message::user("Hello!")),
//!     None,
//! ).await?;
//! ```

pub mod error;
pub mod types;

pub use error::{OllamaError, Result};
pub use types::*;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};

/// Default local Ollama endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Pulls can download gigabytes; they get their own generous timeout.
const PULL_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Readiness checks should fail fast.
const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Pure Ollama API client.
#[derive(Clone)]
pub struct OllamaClient {
    http_client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl OllamaClient {
    /// Create a new client for the given base URL.
    ///
    /// The URL is normalized: a missing scheme becomes `http://`, any
    /// `/api/...` suffix is dropped, and trailing slashes are trimmed.
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: normalize_base_url(base_url.as_ref()),
            request_timeout: Duration::from_secs(120),
        }
    }

    /// Create from environment variable `LOCAL_URL`, falling back to the local default.
    pub fn from_env() -> Self {
        let url = std::env::var("LOCAL_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(url)
    }

    /// Set the default timeout for completion requests.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Get the normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the default completion timeout.
    pub fn timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Check that the server answers.
    ///
    /// Tries the root endpoint first and `/api/tags` as a backup.
    pub async fn ping(&self) -> Result<()> {
        let root = self
            .http_client
            .get(&self.base_url)
            .timeout(PING_TIMEOUT)
            .send()
            .await;

        match root {
            Ok(response) if response.status().is_success() => return Ok(()),
            Ok(response) => debug!(status = %response.status(), "Ollama root check not OK"),
            Err(e) => debug!(error = %e, "Ollama root check failed"),
        }

        let response = self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(PING_TIMEOUT)
            .send()
            .await
            .map_err(OllamaError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OllamaError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// List locally available models.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let response = self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(OllamaError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OllamaError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let tags: types::TagsResponse = response
            .json()
            .await
            .map_err(|e| OllamaError::Parse(e.to_string()))?;

        Ok(tags.models)
    }

    /// Whether the named model is available locally (exact or tagged match).
    pub async fn has_model(&self, model: &str) -> Result<bool> {
        let models = self.list_models().await?;
        let found = models.iter().any(|m| model_name_matches(&m.name, model));
        if !found {
            debug!(
                model = %model,
                available = ?models.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
                "Model not in local list"
            );
        }
        Ok(found)
    }

    /// Pull a model from the registry and wait for the download to finish.
    pub async fn pull_model(&self, model: &str) -> Result<()> {
        info!(model = %model, "Pulling model from registry");
        let start = std::time::Instant::now();

        let request = types::PullRequest {
            model: model.to_string(),
            name: model.to_string(),
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/pull", self.base_url))
            .timeout(PULL_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(OllamaError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(model = %model, status = %status, error = %body, "Model pull failed");
            return Err(OllamaError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let pulled: types::PullResponse = response
            .json()
            .await
            .map_err(|e| OllamaError::Parse(e.to_string()))?;

        if let Some(error) = pulled.error {
            return Err(OllamaError::Api { status: 500, body: error });
        }

        info!(
            model = %model,
            status = pulled.status.as_deref().unwrap_or("unknown"),
            duration_s = start.elapsed().as_secs(),
            "Model pull finished"
        );
        Ok(())
    }

    /// Chat completion.
    ///
    /// `timeout` overrides the client default for this call.
    pub async fn chat_completion(
        &self,
        request: ChatRequest,
        timeout: Option<Duration>,
    ) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/api/chat", self.base_url))
            .timeout(timeout.unwrap_or(self.request_timeout))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Ollama chat request failed");
                OllamaError::from_reqwest(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %body, "Ollama API error");
            return Err(OllamaError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let raw: types::ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| OllamaError::Parse(e.to_string()))?;

        let content = raw
            .message
            .map(|m| m.content)
            .ok_or_else(|| OllamaError::Parse("chat response has no message".into()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            eval_count = raw.eval_count,
            "Ollama chat completion"
        );

        Ok(ChatResponse {
            content,
            prompt_eval_count: raw.prompt_eval_count,
            eval_count: raw.eval_count,
        })
    }

    /// Raw prompt generation (used to warm a model into memory).
    pub async fn generate(
        &self,
        request: GenerateRequest,
        timeout: Option<Duration>,
    ) -> Result<String> {
        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .timeout(timeout.unwrap_or(self.request_timeout))
            .json(&request)
            .send()
            .await
            .map_err(OllamaError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OllamaError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let raw: types::GenerateResponseRaw = response
            .json()
            .await
            .map_err(|e| OllamaError::Parse(e.to_string()))?;

        raw.response
            .ok_or_else(|| OllamaError::Parse("generate response has no `response` field".into()))
    }
}

/// Normalize a configured Ollama URL to a bare base URL.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    // Only look for `/api` in the path, never in the host.
    let path_start = with_scheme
        .find("://")
        .map(|i| i + 3)
        .and_then(|host_start| with_scheme[host_start..].find('/').map(|p| host_start + p));

    let base = match path_start {
        Some(path_start) => {
            let path = &with_scheme[path_start..];
            match path.find("/api") {
                Some(idx)
                    if path[idx + 4..].is_empty() || path[idx + 4..].starts_with('/') =>
                {
                    &with_scheme[..path_start + idx]
                }
                _ => with_scheme.as_str(),
            }
        }
        None => with_scheme.as_str(),
    };

    base.trim_end_matches('/').to_string()
}
