//! Provider-agnostic request and response types.
//!
//! Every reasoning call in the loop is single-turn: a system prompt and one
//! user prompt in, free-form text out. These types keep the orchestration
//! loop independent of any LLM SDK.

use serde::{Deserialize, Serialize};

/// Role of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// The prompt itself.
    User,
}

/// A single prompt message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Creates a message.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A reasoning request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// System message followed by the prompt.
    pub messages: Vec<ChatMessage>,
    /// Completion budget, when bounded.
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Creates a single-turn request: one system message, one user message.
    #[must_use]
    pub fn single_turn(model: &str, system_prompt: &str, prompt: &str, max_tokens: u32) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![
                ChatMessage::new(Role::System, system_prompt),
                ChatMessage::new(Role::User, prompt),
            ],
            max_tokens: Some(max_tokens),
        }
    }

    /// Content of the first message with the given role, or `""`.
    #[must_use]
    pub fn content_of(&self, role: Role) -> &str {
        self.messages
            .iter()
            .find(|m| m.role == role)
            .map_or("", |m| m.content.as_str())
    }

    /// Total characters across all messages.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.messages.iter().map(|m| m.content.chars().count()).sum()
    }
}

/// A reasoning response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatResponse {
    /// Generated text (may be empty).
    pub content: String,
    /// Completion tokens, when the provider reports them.
    pub completion_tokens: Option<u32>,
}

impl ChatResponse {
    /// Creates a response carrying only text.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            completion_tokens: None,
        }
    }

    /// Whether the reply has no usable text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}
