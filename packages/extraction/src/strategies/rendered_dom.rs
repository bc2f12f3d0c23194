//! Rendered-DOM strategy: the widest parse, through a headless browser.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::require_turns;
use crate::error::StrategyResult;
use crate::parse::{dom, filters::check_page_health};
use crate::target::ExtractionTarget;
use crate::traits::{fetcher::PageFetcher, strategy::ExtractionStrategy};
use crate::types::conversation::ConversationTurn;

pub const NAME: &str = "rendered_dom";

/// Renders the link through its own fetcher (normally a [`crate::RenderClient`])
/// and parses the resulting DOM. Does not use the shared static markup.
pub struct RenderedDomStrategy {
    renderer: Arc<dyn PageFetcher>,
    timeout: Duration,
}

impl RenderedDomStrategy {
    pub fn new(renderer: Arc<dyn PageFetcher>) -> Self {
        Self {
            renderer,
            timeout: Duration::from_secs(45),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ExtractionStrategy for RenderedDomStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn attempt(&self, target: &ExtractionTarget) -> StrategyResult<Vec<ConversationTurn>> {
        let page = self.renderer.fetch(target.url()).await?;
        check_page_health(&page)?;

        let turns = dom::parse_turns(&page.html);
        debug!(url = %target.url(), turns = turns.len(), "Parsed rendered DOM");
        require_turns(turns, "no turn markers in rendered DOM")
    }
}
