//! Conversation and profile types exchanged with the memory store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl Default for MessageRole {
    fn default() -> Self {
        Self::User
    }
}

/// A message in a stored conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }
}

/// A ranked conversation returned by the memory store search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMatch {
    pub conversation_id: String,
    pub score: f32,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl ConversationMatch {
    /// Whole days elapsed since this conversation happened.
    pub fn days_since(&self, now: DateTime<Utc>) -> i64 {
        (now - self.timestamp).num_days()
    }

    /// Concatenated message contents, newline separated.
    pub fn content(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A categorized personal-info snippet from the user's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileFact {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub category: String,
    pub importance: String,
}

/// Quiz details attached to an incorrect attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizInfo {
    pub quiz_id: String,
    pub question_type: String,
    pub question: String,
    pub difficulty: String,
    pub topic: String,
}

/// A previously incorrect quiz attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncorrectAttempt {
    pub attempt_id: i64,
    pub quiz: QuizInfo,
    pub user_answer: String,
    pub correct_answer: String,
}

/// Kind tag for records written back to the memory store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Chat,
    MemoryEvaluation,
}

/// Metadata attached to a saved conversation record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<RecordKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
}

/// A record persisted to the memory store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveRecord {
    pub conversation_id: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SaveMetadata>,
}
