//! Text-heuristic strategy: last resort over the visible page text.

use std::time::Duration;

use async_trait::async_trait;

use super::require_turns;
use crate::error::StrategyResult;
use crate::parse::{paragraphs, text::visible_text};
use crate::target::ExtractionTarget;
use crate::traits::strategy::ExtractionStrategy;
use crate::types::conversation::ConversationTurn;

pub const NAME: &str = "text_heuristic";

pub struct TextHeuristicStrategy {
    timeout: Duration,
}

impl TextHeuristicStrategy {
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

impl Default for TextHeuristicStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExtractionStrategy for TextHeuristicStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn attempt(&self, target: &ExtractionTarget) -> StrategyResult<Vec<ConversationTurn>> {
        let page = target.page().await?;
        let text = visible_text(&page.html);
        require_turns(
            paragraphs::split_turns(&text),
            "no message-sized text blocks",
        )
    }
}
