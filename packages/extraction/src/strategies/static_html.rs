//! Static-markup strategy: the same DOM parse over the un-rendered page.

use std::time::Duration;

use async_trait::async_trait;

use super::require_turns;
use crate::error::StrategyResult;
use crate::parse::dom;
use crate::target::ExtractionTarget;
use crate::traits::strategy::ExtractionStrategy;
use crate::types::conversation::ConversationTurn;

pub const NAME: &str = "static_html";

pub struct StaticHtmlStrategy {
    timeout: Duration,
}

impl StaticHtmlStrategy {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(20),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for StaticHtmlStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExtractionStrategy for StaticHtmlStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn attempt(&self, target: &ExtractionTarget) -> StrategyResult<Vec<ConversationTurn>> {
        let page = target.page().await?;
        require_turns(dom::parse_turns(&page.html), "no turn markers in static markup")
    }
}
