//! Embedded-JSON strategy: message nodes in hydration payloads.

use std::time::Duration;

use async_trait::async_trait;

use super::require_turns;
use crate::error::StrategyResult;
use crate::parse::embedded;
use crate::target::ExtractionTarget;
use crate::traits::strategy::ExtractionStrategy;
use crate::types::conversation::ConversationTurn;

pub const NAME: &str = "embedded_json";

pub struct EmbeddedJsonStrategy {
    timeout: Duration,
}

impl EmbeddedJsonStrategy {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for EmbeddedJsonStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExtractionStrategy for EmbeddedJsonStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn attempt(&self, target: &ExtractionTarget) -> StrategyResult<Vec<ConversationTurn>> {
        let page = target.page().await?;
        require_turns(
            embedded::parse_turns(&page.html),
            "no message nodes in script payloads",
        )
    }
}
