//! Ollama API request and response types.

use serde::{Deserialize, Serialize};

// =============================================================================
// Chat
// =============================================================================

/// Chat request for `/api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model to use (e.g., "llama3.1", "qwen2.5:7b")
    pub model: String,

    /// Conversation messages
    pub messages: Vec<Message>,

    /// Always false; this client never streams
    pub stream: bool,

    /// Sampling options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ModelOptions>,
}

impl ChatRequest {
    /// Create a new chat request with the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            stream: false,
            options: None,
        }
    }

    /// Add a message to the conversation.
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.get_or_insert_with(ModelOptions::default).temperature = Some(temperature);
        self
    }

    /// Cap the number of generated tokens.
    pub fn num_predict(mut self, num_predict: i32) -> Self {
        self.options.get_or_insert_with(ModelOptions::default).num_predict = Some(num_predict);
        self
    }
}

/// Model sampling options.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModelOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i32>,
}

/// Chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role: "system", "user", "assistant"
    pub role: String,

    /// Message content
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Response content
    pub content: String,

    /// Tokens in the prompt, if reported
    pub prompt_eval_count: Option<u32>,

    /// Tokens generated, if reported
    pub eval_count: Option<u32>,
}

/// Raw chat response from API (for internal parsing).
#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponseRaw {
    pub message: Option<ChatMessageResponse>,
    pub prompt_eval_count: Option<u32>,
    pub eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatMessageResponse {
    pub content: String,
}

// =============================================================================
// Generate
// =============================================================================

/// Request for `/api/generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ModelOptions>,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: false,
            options: None,
        }
    }

    pub fn num_predict(mut self, num_predict: i32) -> Self {
        self.options.get_or_insert_with(ModelOptions::default).num_predict = Some(num_predict);
        self
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponseRaw {
    pub response: Option<String>,
}

// =============================================================================
// Model management
// =============================================================================

/// Response body from `/api/tags`.
#[derive(Debug, Deserialize)]
pub(crate) struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

/// A locally available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Request body for `/api/pull`.
///
/// Newer servers read `model`, older ones `name`; both are sent.
#[derive(Debug, Serialize)]
pub(crate) struct PullRequest {
    pub model: String,
    pub name: String,
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PullResponse {
    pub status: Option<String>,
    pub error: Option<String>,
}

// =============================================================================
// Utilities
// =============================================================================

/// Whether a listed model name satisfies a requested one.
///
/// `llama3` matches `llama3` and `llama3:latest`, but not `llama3.1`.
pub fn model_name_matches(listed: &str, requested: &str) -> bool {
    listed == requested
        || listed
            .strip_prefix(requested)
            .is_some_and(|rest| rest.starts_with(':'))
        || (!requested.contains(':') && listed == format!("{requested}:latest"))
}

/// Truncate a string to at most `max_bytes` bytes at a character boundary.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

/// Strip markdown code blocks from a response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let sys = Message::system("You are helpful");
        assert_eq!(sys.role, "system");

        let user = Message::user("Hello");
        assert_eq!(user.role, "user");

        let assistant = Message::assistant("Hi there");
        assert_eq!(assistant.role, "assistant");
    }

    #[test]
    fn test_chat_request_builder() {
        let req = ChatRequest::new("llama3")
            .message(Message::user("Hello"))
            .temperature(0.7)
            .num_predict(100);

        assert_eq!(req.model, "llama3");
        assert_eq!(req.messages.len(), 1);
        assert!(!req.stream);
        let options = req.options.unwrap();
        assert_eq!(options.temperature, Some(0.7));
        assert_eq!(options.num_predict, Some(100));
    }

    #[test]
    fn test_chat_request_serializes_without_empty_options() {
        let req = ChatRequest::new("llama3").message(Message::user("hi"));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["stream"], false);
        assert!(json.get("options").is_none());
    }

    #[test]
    fn test_model_name_matches() {
        assert!(model_name_matches("llama3", "llama3"));
        assert!(model_name_matches("llama3:latest", "llama3"));
        assert!(model_name_matches("llama3:8b", "llama3"));
        assert!(!model_name_matches("llama3.1:8b", "llama3"));
        assert!(!model_name_matches("llama3:8b", "llama3:70b"));
    }

    #[test]
    fn test_truncate_to_char_boundary() {
        let text = "Hello 世界";
        let truncated = truncate_to_char_boundary(text, 8);
        assert!(truncated.len() <= 8);
        assert!(text.starts_with(truncated));
    }

    #[test]
    fn test_strip_code_blocks() {
        assert_eq!(strip_code_blocks("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("```\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("{}"), "{}");
    }
}
