//! Lenient parsing of model replies into [`InsightRecord`]s.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::models::{normalize_tags, InsightRecord, Sentiment};

#[derive(Deserialize)]
struct RawInsight {
    #[serde(default)]
    user_name: Option<String>,
    user_background: String,
    main_topic: String,
    problem_described: String,
    solution_provided: String,
    #[serde(default)]
    tags: RawTags,
    sentiment: String,
}

/// Models sometimes answer tags as a comma-separated string.
#[derive(Deserialize, Default)]
#[serde(untagged)]
enum RawTags {
    List(Vec<String>),
    Joined(String),
    #[default]
    Missing,
}

impl RawTags {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::List(tags) => tags,
            Self::Joined(joined) => joined.split(',').map(str::to_string).collect(),
            Self::Missing => Vec::new(),
        }
    }
}

/// Pull the JSON object out of a reply.
///
/// Tries the whole reply (code fences removed), then the span from the first
/// `{` to the last `}`.
pub fn extract_json_object(reply: &str) -> Result<Value, String> {
    let stripped = ollama_client::strip_code_blocks(reply);
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(stripped) {
        return Ok(value);
    }

    let start = reply.find('{');
    let end = reply.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => {
            serde_json::from_str::<Value>(&reply[start..=end])
                .map_err(|e| format!("invalid JSON object: {}", e))
                .and_then(|value| match value {
                    Value::Object(_) => Ok(value),
                    _ => Err("reply is not a JSON object".to_string()),
                })
        }
        _ => Err("no JSON object in reply".to_string()),
    }
}

/// Parse a reply into a record stamped with `created_at`.
///
/// Any `created_at` in the reply is ignored.
pub fn parse_insight(reply: &str, created_at: DateTime<Utc>) -> Result<InsightRecord, String> {
    let value = extract_json_object(reply)?;
    let raw: RawInsight =
        serde_json::from_value(value).map_err(|e| format!("schema mismatch: {}", e))?;

    let sentiment = Sentiment::parse(&raw.sentiment)
        .ok_or_else(|| format!("unknown sentiment `{}`", raw.sentiment))?;

    let user_name = raw
        .user_name
        .map(|n| n.trim().to_string())
        .filter(|n| {
            !n.is_empty() && !n.eq_ignore_ascii_case("null") && !n.eq_ignore_ascii_case("unknown")
        });

    Ok(InsightRecord {
        user_name,
        user_background: raw.user_background.trim().to_string(),
        main_topic: raw.main_topic.trim().to_string(),
        problem_described: raw.problem_described.trim().to_string(),
        solution_provided: raw.solution_provided.trim().to_string(),
        tags: normalize_tags(raw.tags.into_vec()),
        sentiment,
        created_at,
    })
}
