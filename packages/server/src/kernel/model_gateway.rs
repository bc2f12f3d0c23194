//! Ollama-backed model gateway.
//!
//! Wraps the pure `ollama-client` with the service policies the pipeline
//! relies on: readiness probing with backoff, pull-on-missing bootstrap, and
//! error classification into [`ModelError`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use ollama_client::{ChatRequest, GenerateRequest, Message, OllamaClient, OllamaError};
use tracing::{debug, info, warn};

use super::traits::{BaseModelGateway, CompletionOptions, ModelError};

/// Readiness check backoff: first delay, multiplier 2, ceiling.
const READY_INITIAL_DELAY: Duration = Duration::from_millis(500);
const READY_MAX_DELAY: Duration = Duration::from_secs(3);

/// Warm-up generation gets a fixed budget; a cold model load can be slow.
const WARM_UP_TIMEOUT: Duration = Duration::from_secs(60);

pub struct OllamaGateway {
    client: OllamaClient,
    model: String,
    health_check_attempts: u32,
}

impl OllamaGateway {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            health_check_attempts: 5,
        }
    }

    pub fn with_health_check_attempts(mut self, attempts: u32) -> Self {
        self.health_check_attempts = attempts.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    async fn warm_up(&self, name: &str) {
        let start = Instant::now();
        let request = GenerateRequest::new(name, "ping").num_predict(1);
        match self.client.generate(request, Some(WARM_UP_TIMEOUT)).await {
            Ok(_) => info!(
                model = %name,
                duration_ms = start.elapsed().as_millis(),
                "Model warmed up"
            ),
            Err(e) => warn!(model = %name, error = %e, "Model warm-up failed"),
        }
    }
}

/// Delay before readiness check number `attempt` (1-based, after the first failure).
pub fn readiness_delay(attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    READY_INITIAL_DELAY
        .saturating_mul(factor)
        .min(READY_MAX_DELAY)
}

/// Classify a client error for the pipeline.
pub fn classify(error: OllamaError) -> ModelError {
    if error.is_unreachable() {
        ModelError::ServiceUnavailable(error.to_string())
    } else if error.is_model_missing() {
        ModelError::ModelUnavailable(error.to_string())
    } else {
        ModelError::Request(error.to_string())
    }
}

#[async_trait]
impl BaseModelGateway for OllamaGateway {
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, ModelError> {
        let mut request = ChatRequest::new(&self.model);
        if let Some(system) = &options.system {
            request = request.message(Message::system(system));
        }
        request = request.message(Message::user(prompt));
        if let Some(temperature) = options.temperature {
            request = request.temperature(temperature);
        }
        if let Some(max_tokens) = options.max_tokens {
            request = request.num_predict(max_tokens as i32);
        }

        let response = self
            .client
            .chat_completion(request, options.timeout)
            .await
            .map_err(classify)?;

        debug!(
            model = %self.model,
            prompt_tokens = response.prompt_eval_count,
            completion_tokens = response.eval_count,
            "Model completion"
        );
        Ok(response.content)
    }

    async fn ensure_ready(&self) -> Result<(), ModelError> {
        let mut last_error = String::from("no readiness check attempted");

        for attempt in 1..=self.health_check_attempts {
            match self.client.ping().await {
                Ok(()) => {
                    debug!(base_url = %self.client.base_url(), attempt, "Model service ready");
                    return Ok(());
                }
                Err(e) => {
                    last_error = e.to_string();
                    debug!(attempt, error = %e, "Model service readiness check failed");
                }
            }

            if attempt < self.health_check_attempts {
                tokio::time::sleep(readiness_delay(attempt)).await;
            }
        }

        Err(ModelError::ServiceUnavailable(format!(
            "{} did not answer after {} attempts: {}",
            self.client.base_url(),
            self.health_check_attempts,
            last_error
        )))
    }

    async fn ensure_model(&self, name: &str) -> Result<(), ModelError> {
        let present = self.client.has_model(name).await.map_err(classify)?;

        if !present {
            info!(model = %name, "Model not available locally, pulling");
            self.client.pull_model(name).await.map_err(|e| {
                ModelError::ModelUnavailable(format!("pull of {} failed: {}", name, e))
            })?;

            let present = self.client.has_model(name).await.map_err(classify)?;
            if !present {
                return Err(ModelError::ModelUnavailable(format!(
                    "{} still missing after pull",
                    name
                )));
            }
        }

        self.warm_up(name).await;
        Ok(())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
