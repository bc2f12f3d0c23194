//! Built-in extraction strategies, in default chain order.

pub mod embedded_json;
pub mod rendered_dom;
pub mod static_html;
pub mod text_heuristic;

pub use embedded_json::EmbeddedJsonStrategy;
pub use rendered_dom::RenderedDomStrategy;
pub use static_html::StaticHtmlStrategy;
pub use text_heuristic::TextHeuristicStrategy;

use crate::error::{StrategyFailure, StrategyResult};
use crate::types::conversation::ConversationTurn;

/// Turn an empty parse into `MalformedContent`.
pub(crate) fn require_turns(
    turns: Vec<ConversationTurn>,
    reason: &str,
) -> StrategyResult<Vec<ConversationTurn>> {
    if turns.is_empty() {
        Err(StrategyFailure::MalformedContent(reason.to_string()))
    } else {
        Ok(turns)
    }
}
