use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Case-insensitive parse of `positive` / `neutral` / `negative`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Self::Positive),
            "neutral" => Some(Self::Neutral),
            "negative" => Some(Self::Negative),
            _ => None,
        }
    }
}

/// Structured summary of one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRecord {
    pub user_name: Option<String>,
    pub user_background: String,
    pub main_topic: String,
    pub problem_described: String,
    pub solution_provided: String,
    /// Trimmed, lowercased, deduplicated
    pub tags: BTreeSet<String>,
    pub sentiment: Sentiment,
    /// Stamped when the record is synthesized, never taken from model output
    pub created_at: DateTime<Utc>,
}

/// Normalize free-form tags: trim, lowercase, drop empties, dedupe.
pub fn normalize_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_parse() {
        assert_eq!(Sentiment::parse("Positive"), Some(Sentiment::Positive));
        assert_eq!(Sentiment::parse(" NEGATIVE "), Some(Sentiment::Negative));
        assert_eq!(Sentiment::parse("mixed"), None);
    }

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags(vec![" Rust ", "rust", "", "Async", "  "]);
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["async", "rust"]);
    }
}
