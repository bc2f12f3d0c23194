//! Canned model replies, turns, and strategies.

use std::time::Duration;

use extraction::testing::MockStrategy;
use extraction::{Conversation, ConversationTurn, StrategyFailure};
use server_core::kernel::MockModelGateway;

pub const SHARE_LINK: &str = "https://chatgpt.com/share/6f1c2b3a-9d4e-4f5a-8b6c-7d8e9f0a1b2c";

/// Appears in the link-generation prompt only
pub const LINK_NEEDLE: &str = "shared-conversation link";

/// Appears in the insight prompt (and its corrective retry) only
pub const INSIGHT_NEEDLE: &str = "Analyze the following conversation";

pub const INSIGHT_JSON: &str = r#"{
    "user_name": "Sam",
    "user_background": "backend developer learning Rust",
    "main_topic": "async cancellation",
    "problem_described": "tasks keep running after shutdown",
    "solution_provided": "use a cancellation token and select on it",
    "tags": ["Rust", "tokio", "rust"],
    "sentiment": "positive"
}"#;

pub fn turns() -> Vec<ConversationTurn> {
    vec![
        ConversationTurn::user("Hi, I'm Sam. My tokio tasks keep running after shutdown, why?"),
        ConversationTurn::assistant(
            "Nothing tells them to stop. Pass a CancellationToken and select on cancelled().",
        ),
        ConversationTurn::user("That worked, thanks!"),
    ]
}

pub fn conversation(link: &str) -> Conversation {
    Conversation::from_turns(link, turns(), "static_html").expect("fixture turns are non-empty")
}

/// Gateway that returns a valid link and a valid insight.
pub fn working_gateway() -> MockModelGateway {
    MockModelGateway::new()
        .with_reply(LINK_NEEDLE, &format!("Here you go: {}", SHARE_LINK))
        .with_reply(INSIGHT_NEEDLE, INSIGHT_JSON)
}

pub fn succeeding_strategy() -> MockStrategy {
    MockStrategy::new("mock_static").with_turns(turns())
}

pub fn failing_strategy(name: &str) -> MockStrategy {
    MockStrategy::new(name).with_failure(StrategyFailure::NotFound("HTTP 404".into()))
}

pub fn slow_strategy(delay: Duration) -> MockStrategy {
    succeeding_strategy().with_delay(delay)
}
