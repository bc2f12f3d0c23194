//! Conversation extractor: the ordered fallback chain.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{ExtractionError, Result, StrategyAttempt, StrategyFailure, StrategyResult};
use crate::parse::filters::strip_error_banners;
use crate::strategies::{
    EmbeddedJsonStrategy, RenderedDomStrategy, StaticHtmlStrategy, TextHeuristicStrategy,
};
use crate::target::ExtractionTarget;
use crate::traits::{fetcher::PageFetcher, strategy::ExtractionStrategy};
use crate::types::conversation::{Conversation, ConversationTurn, Role};

/// Resolves a share link into a [`Conversation`].
///
/// Strategies run in order; the first that yields turns (after error banners
/// are stripped) wins. Each strategy is bounded by its own timeout.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use extraction::{ConversationExtractor, HttpFetcher};
///
/// let extractor = ConversationExtractor::default_chain(Arc::new(HttpFetcher::new()?), None);
/// let conversation = extractor.extract("https://chatgpt.com/share/...").await?;
/// println!("{} turns via {}", conversation.turns.len(), conversation.extraction_method);
/// ```
#[derive(Clone)]
pub struct ConversationExtractor {
    fetcher: Arc<dyn PageFetcher>,
    strategies: Vec<Arc<dyn ExtractionStrategy>>,
}

impl ConversationExtractor {
    /// Create an extractor with no strategies.
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            strategies: Vec::new(),
        }
    }

    /// Append a strategy to the chain.
    pub fn with_strategy(mut self, strategy: impl ExtractionStrategy + 'static) -> Self {
        self.strategies.push(Arc::new(strategy));
        self
    }

    /// The standard chain: rendered DOM (when a renderer is given), static
    /// markup, embedded JSON, text heuristic.
    pub fn default_chain(
        fetcher: Arc<dyn PageFetcher>,
        renderer: Option<Arc<dyn PageFetcher>>,
    ) -> Self {
        let mut extractor = Self::new(fetcher);
        if let Some(renderer) = renderer {
            extractor = extractor.with_strategy(RenderedDomStrategy::new(renderer));
        }
        extractor
            .with_strategy(StaticHtmlStrategy::new())
            .with_strategy(EmbeddedJsonStrategy::new())
            .with_strategy(TextHeuristicStrategy::new())
    }

    /// Strategy names in chain order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Extract the conversation behind `link`.
    ///
    /// Never returns a conversation without turns; when every strategy fails
    /// the error carries each strategy's failure.
    pub async fn extract(&self, link: &str) -> Result<Conversation> {
        if self.strategies.is_empty() {
            return Err(ExtractionError::NoStrategies);
        }

        let target = ExtractionTarget::new(link, self.fetcher.clone());
        let mut failures = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let started = Instant::now();
            let outcome = run_strategy(strategy.as_ref(), &target).await;

            match outcome {
                Ok(turns) => {
                    let Some(conversation) = Conversation::from_turns(link, turns, strategy.name())
                    else {
                        failures.push(StrategyAttempt {
                            strategy: strategy.name().to_string(),
                            failure: StrategyFailure::MalformedContent("only empty turns".into()),
                        });
                        continue;
                    };

                    log_role_balance(link, &conversation);
                    info!(
                        url = %link,
                        strategy = strategy.name(),
                        turns = conversation.turns.len(),
                        duration_ms = started.elapsed().as_millis(),
                        "Conversation extracted"
                    );
                    return Ok(conversation);
                }
                Err(failure) => {
                    debug!(
                        url = %link,
                        strategy = strategy.name(),
                        error = %failure,
                        duration_ms = started.elapsed().as_millis(),
                        "Extraction strategy failed"
                    );
                    failures.push(StrategyAttempt {
                        strategy: strategy.name().to_string(),
                        failure,
                    });
                }
            }
        }

        warn!(url = %link, attempts = failures.len(), "All extraction strategies failed");
        Err(ExtractionError::AllStrategiesFailed {
            url: link.to_string(),
            failures,
        })
    }
}

/// One bounded attempt with error banners removed.
async fn run_strategy(
    strategy: &dyn ExtractionStrategy,
    target: &ExtractionTarget,
) -> StrategyResult<Vec<ConversationTurn>> {
    let timeout = strategy.timeout();
    let turns = match tokio::time::timeout(timeout, strategy.attempt(target)).await {
        Ok(result) => result?,
        Err(_) => return Err(StrategyFailure::Timeout(timeout)),
    };

    let total = turns.len();
    let kept = strip_error_banners(turns);
    if kept.is_empty() {
        let reason = if total == 0 {
            "no turns".to_string()
        } else {
            format!("all {} turns were error banners", total)
        };
        return Err(StrategyFailure::MalformedContent(reason));
    }
    Ok(kept)
}

fn log_role_balance(link: &str, conversation: &Conversation) {
    if conversation.count_role(Role::User) == 0 {
        warn!(url = %link, "No user turns detected; role detection may be off");
    } else if conversation.count_role(Role::Assistant) == 0 {
        warn!(url = %link, "No assistant turns detected; role detection may be off");
    }
}
