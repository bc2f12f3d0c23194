//! Conversation types - turns, roles, and the extracted conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Map a role label found in markup or JSON to a turn role.
    ///
    /// Returns `None` for roles that are not part of the visible dialogue
    /// (system, tool) or are unknown.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "user" | "human" | "you" => Some(Self::User),
            "assistant" | "ai" | "chatgpt" | "bot" | "model" => Some(Self::Assistant),
            _ => None,
        }
    }

    /// The other speaker.
    pub fn other(self) -> Self {
        match self {
            Self::User => Self::Assistant,
            Self::Assistant => Self::User,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    /// Create a turn; content is trimmed.
    pub fn new(role: Role, content: impl AsRef<str>) -> Self {
        Self {
            role,
            content: content.as_ref().trim().to_string(),
        }
    }

    pub fn user(content: impl AsRef<str>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl AsRef<str>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// A conversation resolved from a share link.
///
/// Always holds at least one turn; see [`Conversation::from_turns`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// The link the conversation was extracted from
    pub source_link: String,

    /// Ordered turns
    pub turns: Vec<ConversationTurn>,

    /// When extraction finished
    pub extracted_at: DateTime<Utc>,

    /// Name of the strategy that produced the turns
    pub extraction_method: String,
}

impl Conversation {
    /// Build a conversation, dropping empty turns.
    ///
    /// Returns `None` when no turn with content remains.
    pub fn from_turns(
        source_link: impl Into<String>,
        turns: Vec<ConversationTurn>,
        extraction_method: impl Into<String>,
    ) -> Option<Self> {
        let turns: Vec<_> = turns.into_iter().filter(|t| t.has_content()).collect();
        if turns.is_empty() {
            return None;
        }

        Some(Self {
            source_link: source_link.into(),
            turns,
            extracted_at: Utc::now(),
            extraction_method: extraction_method.into(),
        })
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.turns.iter().filter(|t| t.role == role).count()
    }

    /// First user message, if any.
    pub fn first_user_message(&self) -> Option<&str> {
        self.turns
            .iter()
            .find(|t| t.role == Role::User)
            .map(|t| t.content.as_str())
    }

    /// Render as `ROLE: content` blocks separated by blank lines.
    pub fn transcript(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("{}: {}", t.role.as_str().to_uppercase(), t.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
