//! Turn splitting over plain visible text.
//!
//! Narrowest parse in the chain: speaker labels when the page has them,
//! otherwise paragraph blocks with guessed roles.

use lazy_static::lazy_static;
use regex::Regex;

use crate::parse::roles::{alternate, guess_role_from_content};
use crate::types::conversation::{ConversationTurn, Role};

pub const MIN_SEGMENT_CHARS: usize = 50;
pub const MAX_SEGMENT_CHARS: usize = 5000;
pub const MAX_SEGMENTS: usize = 20;

lazy_static! {
    static ref SPEAKER_LABEL: Regex = Regex::new(
        r"(?mi)^[ \t]*(?:(you said|chatgpt said|user|you|assistant|chatgpt)[ \t]*:|(user|assistant|chatgpt)[ \t]*$)[ \t]*"
    )
    .unwrap();
    static ref BLANK_LINE: Regex = Regex::new(r"\n[ \t]*\n").unwrap();
}

/// Split visible text into turns.
pub fn split_turns(text: &str) -> Vec<ConversationTurn> {
    let labelled = split_on_labels(text);
    if !labelled.is_empty() {
        return labelled;
    }
    split_paragraphs(text)
}

/// Segments introduced by "You said:" / "ChatGPT said:" style labels.
///
/// Needs at least two labels; one label is more likely page chrome.
pub fn split_on_labels(text: &str) -> Vec<ConversationTurn> {
    let labels: Vec<(usize, usize, Role)> = SPEAKER_LABEL
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let label = caps.get(1).or_else(|| caps.get(2))?.as_str().to_lowercase();
            let role = if label.starts_with("you") || label == "user" {
                Role::User
            } else {
                Role::Assistant
            };
            Some((whole.start(), whole.end(), role))
        })
        .collect();

    if labels.len() < 2 {
        return Vec::new();
    }

    labels
        .iter()
        .enumerate()
        .filter_map(|(i, (_, end, role))| {
            let next_start = labels.get(i + 1).map(|l| l.0).unwrap_or(text.len());
            let content = text[*end..next_start].trim();
            let chars = content.chars().count();
            (chars > 0 && chars <= MAX_SEGMENT_CHARS).then(|| ConversationTurn::new(*role, content))
        })
        .take(MAX_SEGMENTS)
        .collect()
}

/// Paragraph blocks of reasonable length with phrasing-guessed roles.
pub fn split_paragraphs(text: &str) -> Vec<ConversationTurn> {
    let mut turns: Vec<ConversationTurn> = Vec::new();

    for block in BLANK_LINE.split(text) {
        let block = block.trim();
        let chars = block.chars().count();
        if chars < MIN_SEGMENT_CHARS || chars > MAX_SEGMENT_CHARS {
            continue;
        }

        let previous = turns.last().map(|t| t.role);
        let role = guess_role_from_content(block).unwrap_or_else(|| alternate(previous));
        turns.push(ConversationTurn::new(role, block));

        if turns.len() == MAX_SEGMENTS {
            break;
        }
    }

    turns
}
