//! Phrasing-based role guesses.

use crate::types::conversation::Role;

const USER_PHRASES: &[&str] = &[
    "please",
    "can you",
    "how do i",
    "what is",
    "help me",
    "i want",
    "i need",
    "could you",
    "would you",
];

const ASSISTANT_PHRASES: &[&str] = &[
    "i can help",
    "here is",
    "here are",
    "to answer",
    "certainly",
    "of course",
    "i understand",
    "let me",
];

/// Score the content against user and assistant phrasing.
///
/// Returns `None` on a tie; callers fall back to alternation.
pub fn guess_role_from_content(content: &str) -> Option<Role> {
    let lower = content.to_lowercase();
    let user_score = USER_PHRASES.iter().filter(|p| lower.contains(*p)).count();
    let assistant_score = ASSISTANT_PHRASES
        .iter()
        .filter(|p| lower.contains(*p))
        .count();

    match user_score.cmp(&assistant_score) {
        std::cmp::Ordering::Greater => Some(Role::User),
        std::cmp::Ordering::Less => Some(Role::Assistant),
        std::cmp::Ordering::Equal => None,
    }
}

/// Role implied by alternation after `previous`; a conversation opens with the user.
pub fn alternate(previous: Option<Role>) -> Role {
    previous.map(Role::other).unwrap_or(Role::User)
}

/// Map a class name or test id to a role by its word tokens.
///
/// Tokens are split on non-alphanumerics so `bottom` never reads as `bot`.
pub fn role_from_identifier(identifier: &str) -> Option<Role> {
    let lower = identifier.to_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.iter().any(|t| matches!(*t, "user" | "human")) {
        Some(Role::User)
    } else if tokens
        .iter()
        .any(|t| matches!(*t, "assistant" | "chatgpt" | "bot" | "ai"))
    {
        Some(Role::Assistant)
    } else {
        None
    }
}
