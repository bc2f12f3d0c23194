//! Message nodes embedded as JSON in `<script>` bodies.
//!
//! Share pages ship the conversation as a JSON payload for hydration. The
//! payload can be a plain JSON script, an assignment like `window.x = {...}`,
//! or a JSON string nested inside another JSON document. Any object with an
//! `author.role` and `content.parts` is treated as a message node.

use std::collections::HashSet;

use lazy_static::lazy_static;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::types::conversation::{ConversationTurn, Role};

/// Nested JSON strings are only unpacked this deep.
const MAX_DEPTH: usize = 48;

lazy_static! {
    static ref SCRIPTS: Selector = Selector::parse("script").unwrap();
}

#[derive(Debug)]
struct MessageNode {
    id: Option<String>,
    create_time: Option<f64>,
    role: Role,
    content: String,
}

/// Parse turns from every script body in the page.
pub fn parse_turns(html: &str) -> Vec<ConversationTurn> {
    let document = Html::parse_document(html);
    let mut nodes = Vec::new();

    for script in document.select(&SCRIPTS) {
        let body: String = script.text().collect();
        if let Some(value) = parse_script_body(&body) {
            walk(&value, 0, &mut nodes);
        }
    }

    into_turns(nodes)
}

/// Parse turns from an already decoded JSON document.
pub fn parse_value(value: &Value) -> Vec<ConversationTurn> {
    let mut nodes = Vec::new();
    walk(value, 0, &mut nodes);
    into_turns(nodes)
}

fn parse_script_body(body: &str) -> Option<Value> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    // Assignment or call wrapping a JSON object: decode from the first brace
    // and ignore whatever trails the object.
    let start = trimmed.find('{')?;
    serde_json::Deserializer::from_str(&trimmed[start..])
        .into_iter::<Value>()
        .next()
        .and_then(|r| r.ok())
}

fn walk(value: &Value, depth: usize, nodes: &mut Vec<MessageNode>) {
    if depth > MAX_DEPTH {
        return;
    }

    match value {
        Value::Object(map) => {
            if let Some(node) = message_node(value) {
                nodes.push(node);
                return;
            }
            for child in map.values() {
                walk(child, depth + 1, nodes);
            }
        }
        Value::Array(items) => {
            for child in items {
                walk(child, depth + 1, nodes);
            }
        }
        Value::String(s) => {
            let trimmed = s.trim_start();
            if (trimmed.starts_with('{') || trimmed.starts_with('[')) && trimmed.len() > 2 {
                if let Ok(inner) = serde_json::from_str::<Value>(trimmed) {
                    walk(&inner, depth + 1, nodes);
                }
            }
        }
        _ => {}
    }
}

fn message_node(value: &Value) -> Option<MessageNode> {
    let role_label = value.get("author")?.get("role")?.as_str()?;
    let parts = value.get("content")?.get("parts")?.as_array()?;

    // System and tool nodes are not dialogue.
    let role = Role::parse(role_label)?;

    let content = parts
        .iter()
        .filter_map(|part| match part {
            Value::String(s) => Some(s.as_str()),
            Value::Object(_) => part.get("text").and_then(Value::as_str),
            _ => None,
        })
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    Some(MessageNode {
        id: value.get("id").and_then(Value::as_str).map(str::to_string),
        create_time: value.get("create_time").and_then(Value::as_f64),
        role,
        content,
    })
}

fn into_turns(mut nodes: Vec<MessageNode>) -> Vec<ConversationTurn> {
    nodes.retain(|n| !n.content.is_empty());

    if !nodes.is_empty() && nodes.iter().all(|n| n.create_time.is_some()) {
        nodes.sort_by(|a, b| {
            let a = a.create_time.unwrap_or_default();
            let b = b.create_time.unwrap_or_default();
            a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    let mut seen_ids = HashSet::new();
    let mut turns: Vec<ConversationTurn> = Vec::new();
    for node in nodes {
        if let Some(id) = &node.id {
            if !seen_ids.insert(id.clone()) {
                continue;
            }
        }
        let turn = ConversationTurn::new(node.role, &node.content);
        if turns.last() == Some(&turn) {
            continue;
        }
        turns.push(turn);
    }
    turns
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mapping_payload_sorted_by_create_time() {
        let payload = json!({
            "mapping": {
                "b": {"message": {"id": "b", "create_time": 2.0, "author": {"role": "assistant"}, "content": {"parts": ["Use a HashMap."]}}},
                "a": {"message": {"id": "a", "create_time": 1.0, "author": {"role": "user"}, "content": {"parts": ["How do I count words?"]}}},
                "s": {"message": {"id": "s", "create_time": 0.5, "author": {"role": "system"}, "content": {"parts": ["hidden"]}}}
            }
        });
        let html = format!(
            r#"<html><body><script type="application/json">{}</script></body></html>"#,
            payload
        );

        let turns = parse_turns(&html);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0], ConversationTurn::user("How do I count words?"));
        assert_eq!(turns[1], ConversationTurn::assistant("Use a HashMap."));
    }

    #[test]
    fn test_assignment_wrapped_payload() {
        let html = r#"<html><body><script>window.__DATA__ = {"messages":[{"author":{"role":"user"},"content":{"parts":["Hi there"]}},{"author":{"role":"assistant"},"content":{"parts":["Hello!", {"text": "How can I help?"}]}}]};</script></body></html>"#;

        let turns = parse_turns(html);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].content, "Hello!\nHow can I help?");
    }

    #[test]
    fn test_nested_json_string_is_unpacked() {
        let inner = json!([{"id": "1", "author": {"role": "user"}, "content": {"parts": ["nested question"]}}]);
        let outer = json!({"props": {"state": inner.to_string()}});

        let turns = parse_value(&outer);
        assert_eq!(turns, vec![ConversationTurn::user("nested question")]);
    }

    #[test]
    fn test_duplicate_ids_kept_once() {
        let value = json!([
            {"id": "x", "author": {"role": "user"}, "content": {"parts": ["same"]}},
            {"id": "x", "author": {"role": "user"}, "content": {"parts": ["same"]}}
        ]);
        assert_eq!(parse_value(&value).len(), 1);
    }

    #[test]
    fn test_scripts_without_messages() {
        let html = r#"<html><body><script>console.log("hi")</script><script>{"a": 1}</script></body></html>"#;
        assert!(parse_turns(html).is_empty());
    }
}
