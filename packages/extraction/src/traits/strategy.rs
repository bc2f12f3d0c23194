//! Extraction strategy trait.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StrategyResult;
use crate::target::ExtractionTarget;
use crate::types::conversation::ConversationTurn;

/// One way of turning a link into conversation turns.
///
/// Strategies are tried in order by [`crate::ConversationExtractor`]. The
/// extractor enforces [`timeout`](Self::timeout); a strategy does not need to
/// race its own clock.
///
/// # Example
///
/// ```rust,ignore
/// struct FirstParagraph;
///
/// #[async_trait]
/// impl ExtractionStrategy for FirstParagraph {
///     fn name(&self) -> &str { "first_paragraph" }
///     fn timeout(&self) -> Duration { Duration::from_secs(5) }
///
///     async fn attempt(&self, target: &ExtractionTarget) -> StrategyResult<Vec<ConversationTurn>> {
///         let page = target.page().await?;
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    /// Stable name, recorded as `Conversation::extraction_method`.
    fn name(&self) -> &str;

    /// Upper bound on a single attempt.
    fn timeout(&self) -> Duration;

    /// Try to produce turns for the target link.
    ///
    /// Returning an empty vector is treated the same as
    /// `MalformedContent`.
    async fn attempt(&self, target: &ExtractionTarget) -> StrategyResult<Vec<ConversationTurn>>;
}
