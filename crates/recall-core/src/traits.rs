//! Gateway traits for the two external collaborators.
//!
//! Every call is independently fallible; partial-failure policy lives in
//! the fan-out coordinator, not here. Retries, if ever added, belong to
//! the implementations behind these traits.

use async_trait::async_trait;

use crate::error::RecallResult;
use crate::types::{ChatMessage, ConversationMatch, IncorrectAttempt, ProfileFact, SaveRecord};

/// Abstraction over the memory/retrieval store.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Search for conversations relevant to a query, ranked by score.
    async fn search_conversations(
        &self,
        query: &str,
        limit: usize,
    ) -> RecallResult<Vec<ConversationMatch>>;

    /// Persist a conversation record, returning the stored id.
    async fn save_conversation(&self, record: &SaveRecord) -> RecallResult<String>;

    /// Fetch categorized personal-info snippets for a user.
    async fn get_profile(&self, user_id: &str) -> RecallResult<Vec<ProfileFact>>;

    /// Fetch a bounded list of previously incorrect quiz attempts.
    async fn get_incorrect_attempts(
        &self,
        user_id: &str,
        limit: usize,
    ) -> RecallResult<Vec<IncorrectAttempt>>;

    /// Check whether the store is reachable.
    async fn health_check(&self) -> RecallResult<bool>;
}

/// Options for a completion request.
#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    /// Sampling temperature override.
    pub temperature: Option<f32>,
    /// Maximum tokens override.
    pub max_tokens: Option<u32>,
}

impl CompletionOptions {
    /// Options for structured (JSON-shaped) generation tasks.
    pub fn structured(max_tokens: u32) -> Self {
        Self {
            temperature: Some(0.7),
            max_tokens: Some(max_tokens),
        }
    }
}

/// Abstraction over the LLM completion provider.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a completion for the given messages.
    ///
    /// Fails on transport error or when the provider returns no choices.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: Option<CompletionOptions>,
    ) -> RecallResult<String>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}
