//! Share-link grammar.
//!
//! ```text
//! https://chatgpt.com/share/<uuid>    uuid = 8-4-4-4-12 lowercase hex
//! ```

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SHARE_LINK: Regex = Regex::new(
        r"^https://chatgpt\.com/share/[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$"
    )
    .unwrap();
    static ref URL_TOKEN: Regex = Regex::new(r#"(?i)https?://[^\s"'`<>()\[\]{}]+"#).unwrap();
}

/// Characters stripped from the end of a candidate token.
const TRAILING_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', ')', ']', '}', '"', '\'', '`', '>', '*',
];

/// Whether `url` is a well-formed share link.
pub fn is_valid_share_link(url: &str) -> bool {
    SHARE_LINK.is_match(url)
}

/// Pick the first URL-shaped token from a model reply, normalized.
///
/// Quotes, backticks, angle brackets, and trailing punctuation are removed
/// and the result is lowercased. Returns `None` when the reply contains no URL.
pub fn extract_candidate(reply: &str) -> Option<String> {
    let token = URL_TOKEN.find(reply)?.as_str();
    let trimmed = token.trim_end_matches(TRAILING_PUNCTUATION);

    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}
