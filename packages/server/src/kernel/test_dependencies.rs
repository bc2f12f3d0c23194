// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{BaseModelGateway, CompletionOptions, ModelError};

// =============================================================================
// Mock Model Gateway
// =============================================================================

/// Arguments captured from a complete call
#[derive(Debug, Clone)]
pub struct CompletionCall {
    pub prompt: String,
    pub system: Option<String>,
}

struct ReplyRule {
    needle: String,
    queued: VecDeque<Result<String, ModelError>>,
    fallback: Option<Result<String, ModelError>>,
}

/// Scripted model gateway.
///
/// Replies are chosen by the first rule whose needle appears in the prompt or
/// system prompt: queued replies first, then the rule's fixed reply. Prompts
/// matching no rule get the default reply.
pub struct MockModelGateway {
    model: String,
    rules: Arc<Mutex<Vec<ReplyRule>>>,
    default_reply: Arc<Mutex<Result<String, ModelError>>>,
    ready: Arc<Mutex<Result<(), ModelError>>>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<CompletionCall>>>,
    ensured_models: Arc<Mutex<Vec<String>>>,
}

impl MockModelGateway {
    pub fn new() -> Self {
        Self {
            model: "mock-model".to_string(),
            rules: Arc::new(Mutex::new(Vec::new())),
            default_reply: Arc::new(Mutex::new(Err(ModelError::Request(
                "no mock reply configured".to_string(),
            )))),
            ready: Arc::new(Mutex::new(Ok(()))),
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
            ensured_models: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always answer prompts containing `needle` with `reply`
    pub fn with_reply(self, needle: &str, reply: &str) -> Self {
        self.rules.lock().unwrap().push(ReplyRule {
            needle: needle.to_string(),
            queued: VecDeque::new(),
            fallback: Some(Ok(reply.to_string())),
        });
        self
    }

    /// Answer prompts containing `needle` with these results in order, then fall through
    pub fn with_replies(self, needle: &str, replies: Vec<Result<String, ModelError>>) -> Self {
        self.rules.lock().unwrap().push(ReplyRule {
            needle: needle.to_string(),
            queued: replies.into(),
            fallback: None,
        });
        self
    }

    /// Reply for prompts matching no rule
    pub fn with_default_reply(self, reply: Result<String, ModelError>) -> Self {
        *self.default_reply.lock().unwrap() = reply;
        self
    }

    /// Make every call fail as if the service were down
    pub fn unavailable(self) -> Self {
        let error = ModelError::ServiceUnavailable("mock service down".to_string());
        *self.ready.lock().unwrap() = Err(error.clone());
        *self.default_reply.lock().unwrap() = Err(error);
        self.rules.lock().unwrap().clear();
        self
    }

    /// Sleep before answering each completion
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get all completion calls
    pub fn calls(&self) -> Vec<CompletionCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Count completion calls whose prompt contains `needle`
    pub fn calls_containing(&self, needle: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.prompt.contains(needle))
            .count()
    }

    /// Models passed to ensure_model
    pub fn ensured_models(&self) -> Vec<String> {
        self.ensured_models.lock().unwrap().clone()
    }

    fn next_reply(&self, prompt: &str, system: Option<&str>) -> Result<String, ModelError> {
        let mut rules = self.rules.lock().unwrap();
        for rule in rules.iter_mut() {
            let matches = prompt.contains(&rule.needle)
                || system.is_some_and(|s| s.contains(&rule.needle));
            if !matches {
                continue;
            }
            if let Some(reply) = rule.queued.pop_front() {
                return reply;
            }
            if let Some(reply) = &rule.fallback {
                return reply.clone();
            }
        }
        self.default_reply.lock().unwrap().clone()
    }
}

impl Default for MockModelGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseModelGateway for MockModelGateway {
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, ModelError> {
        self.calls.lock().unwrap().push(CompletionCall {
            prompt: prompt.to_string(),
            system: options.system.clone(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.next_reply(prompt, options.system.as_deref())
    }

    async fn ensure_ready(&self) -> Result<(), ModelError> {
        self.ready.lock().unwrap().clone()
    }

    async fn ensure_model(&self, name: &str) -> Result<(), ModelError> {
        self.ensured_models.lock().unwrap().push(name.to_string());
        self.ready.lock().unwrap().clone()
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rules_queue_then_fallback_then_default() {
        let gateway = MockModelGateway::new()
            .with_replies("link", vec![Ok("first".into())])
            .with_reply("link", "always")
            .with_default_reply(Ok("default".into()));
        let options = CompletionOptions::new();

        assert_eq!(gateway.complete("give me a link", &options).await.unwrap(), "first");
        assert_eq!(gateway.complete("give me a link", &options).await.unwrap(), "always");
        assert_eq!(gateway.complete("other", &options).await.unwrap(), "default");
        assert_eq!(gateway.calls_containing("link"), 2);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let gateway = MockModelGateway::new().with_reply("x", "y").unavailable();
        assert!(gateway.ensure_ready().await.is_err());
        assert!(matches!(
            gateway.complete("x", &CompletionOptions::new()).await,
            Err(ModelError::ServiceUnavailable(_))
        ));
    }
}
