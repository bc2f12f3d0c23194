//! Prompt text for insight synthesis.

use extraction::Conversation;

pub const SYSTEM_PROMPT: &str = "You are a conversation analyst that returns only valid JSON.";

const SCHEMA: &str = r#"{
  "user_name": "name the user gives for themselves, or null",
  "user_background": "brief description of the user's background or context",
  "main_topic": "primary topic discussed",
  "problem_described": "main problem or question raised",
  "solution_provided": "key solution or advice given",
  "tags": ["tag1", "tag2", "tag3"],
  "sentiment": "positive | neutral | negative"
}"#;

/// Longest reply quoted back in a corrective prompt.
const MAX_QUOTED_REPLY: usize = 2000;

/// First request: the conversation plus the schema.
pub fn insight_prompt(conversation: &Conversation) -> String {
    format!(
        "Analyze the following conversation and extract structured insights.\n\n\
         Conversation:\n{}\n\n\
         Return a JSON object with exactly these fields:\n{}\n\n\
         Return ONLY valid JSON, no other text.",
        conversation.transcript(),
        SCHEMA
    )
}

/// Retry request: quotes the parse error and the rejected reply.
pub fn corrective_prompt(conversation: &Conversation, error: &str, invalid_reply: &str) -> String {
    format!(
        "{}\n\n\
         Your previous reply could not be used: {}\n\
         Previous reply:\n{}\n\n\
         Reply again with a single JSON object matching the fields above.",
        insight_prompt(conversation),
        error,
        ollama_client::truncate_to_char_boundary(invalid_reply, MAX_QUOTED_REPLY)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use extraction::ConversationTurn;

    fn conversation() -> Conversation {
        Conversation::from_turns(
            "link",
            vec![
                ConversationTurn::user("My name is Ana, how do I bake bread?"),
                ConversationTurn::assistant("Start with flour, water, salt and yeast."),
            ],
            "static_html",
        )
        .unwrap()
    }

    #[test]
    fn test_insight_prompt_contains_transcript_and_schema() {
        let prompt = insight_prompt(&conversation());
        assert!(prompt.contains("USER: My name is Ana, how do I bake bread?"));
        assert!(prompt.contains("ASSISTANT: Start with flour"));
        assert!(prompt.contains("\"problem_described\""));
    }

    #[test]
    fn test_corrective_prompt_quotes_error_and_reply() {
        let prompt = corrective_prompt(
            &conversation(),
            "missing field `main_topic`",
            "{\"tags\": []}",
        );
        assert!(prompt.contains("missing field `main_topic`"));
        assert!(prompt.contains("{\"tags\": []}"));
        assert!(prompt.contains("Previous reply"));
    }
}
