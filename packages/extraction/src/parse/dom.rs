//! Structural DOM parse for share pages.
//!
//! Used by both the rendered and the static strategy. The primary markers are
//! `[data-message-author-role]` elements; older layouts fall back to turn
//! containers whose role is inferred from avatars, class names, or phrasing.

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};

use crate::parse::roles::{alternate, guess_role_from_content, role_from_identifier};
use crate::parse::text::element_text;
use crate::types::conversation::{ConversationTurn, Role};

/// Secondary containers must carry at least this much text.
const MIN_CONTAINER_CHARS: usize = 10;

const AUTHOR_ROLE_ATTR: &str = "data-message-author-role";

lazy_static! {
    static ref AUTHOR_MARKERS: Selector = Selector::parse("[data-message-author-role]").unwrap();
    static ref CONTAINERS: Vec<Selector> = [
        r#"[data-testid^="conversation-turn"]"#,
        r#"div[class*="ConversationItem"]"#,
        "div.group.w-full",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect();
    static ref CONTENT: Vec<Selector> = [".markdown", ".prose", ".whitespace-pre-wrap"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect();
    static ref USER_HINTS: Selector = Selector::parse(
        r#"img[alt*="User"], img[alt*="user"], img[src*="user"], [aria-label*="User"], [aria-label*="user"], [data-testid*="user"], .user-avatar"#
    )
    .unwrap();
    static ref ASSISTANT_HINTS: Selector = Selector::parse(
        r#"img[alt*="ChatGPT"], img[alt*="Assistant"], img[alt*="assistant"], img[src*="chatgpt"], img[src*="openai"], [aria-label*="ChatGPT"], [aria-label*="Assistant"], [data-testid*="assistant"], .assistant-avatar"#
    )
    .unwrap();
}

/// Parse conversation turns from page markup.
///
/// Returns an empty vector when no turn structure is recognised.
pub fn parse_turns(html: &str) -> Vec<ConversationTurn> {
    let document = Html::parse_document(html);

    let turns = parse_author_markers(&document);
    if !turns.is_empty() {
        return turns;
    }

    for selector in CONTAINERS.iter() {
        let turns = parse_containers(&document, selector);
        if !turns.is_empty() {
            return turns;
        }
    }

    Vec::new()
}

fn parse_author_markers(document: &Html) -> Vec<ConversationTurn> {
    let mut turns: Vec<ConversationTurn> = Vec::new();

    for element in document.select(&AUTHOR_MARKERS) {
        // System and tool messages carry the marker too; they are not dialogue.
        let Some(role) = element.value().attr(AUTHOR_ROLE_ATTR).and_then(Role::parse) else {
            continue;
        };

        let content = message_content(element);
        if content.is_empty() {
            continue;
        }
        push_turn(&mut turns, ConversationTurn::new(role, content));
    }

    turns
}

fn parse_containers(document: &Html, selector: &Selector) -> Vec<ConversationTurn> {
    let mut turns: Vec<ConversationTurn> = Vec::new();

    for element in document.select(selector) {
        let content = message_content(element);
        if content.chars().count() < MIN_CONTAINER_CHARS {
            continue;
        }

        let previous = turns.last().map(|t| t.role);
        let role = detect_role(element, &content).unwrap_or_else(|| alternate(previous));
        push_turn(&mut turns, ConversationTurn::new(role, content));
    }

    turns
}

/// Role of a container: author attribute, avatar/aria hints, class names, phrasing.
fn detect_role(element: ElementRef<'_>, content: &str) -> Option<Role> {
    if let Some(role) = element.value().attr(AUTHOR_ROLE_ATTR).and_then(Role::parse) {
        return Some(role);
    }
    if let Some(role) = element
        .select(&AUTHOR_MARKERS)
        .find_map(|inner| inner.value().attr(AUTHOR_ROLE_ATTR).and_then(Role::parse))
    {
        return Some(role);
    }

    if element.select(&USER_HINTS).next().is_some() {
        return Some(Role::User);
    }
    if element.select(&ASSISTANT_HINTS).next().is_some() {
        return Some(Role::Assistant);
    }

    let identifiers = format!(
        "{} {}",
        element.value().attr("class").unwrap_or_default(),
        element.value().attr("data-testid").unwrap_or_default()
    );
    if let Some(role) = role_from_identifier(&identifiers) {
        return Some(role);
    }

    guess_role_from_content(content)
}

/// Text from the first content selector that matches, else the whole element.
fn message_content(element: ElementRef<'_>) -> String {
    for selector in CONTENT.iter() {
        let parts: Vec<String> = element
            .select(selector)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect();
        if !parts.is_empty() {
            return parts.join("\n");
        }
    }
    element_text(element)
}

/// Nested markers can repeat the same message; keep one copy.
fn push_turn(turns: &mut Vec<ConversationTurn>, turn: ConversationTurn) {
    if turns.last() != Some(&turn) {
        turns.push(turn);
    }
}
