//! Request-scoped fan-out/fan-in over the memory store.
//!
//! Issues the independent upstream lookups for one request concurrently,
//! waits for all of them, and merges the results into a single bundle.
//! A failed optional lookup degrades to empty; only a failed required
//! lookup fails the whole operation. No caching, no retries here.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::warn;

use crate::error::{RecallError, RecallResult};
use crate::traits::MemoryStore;
use crate::types::{ConversationMatch, IncorrectAttempt, MessageRole, ProfileFact};

/// Conversation matches fetched for chat context.
pub const CHAT_SEARCH_LIMIT: usize = 5;
/// Prior mistakes fetched for chat context.
pub const CHAT_MISTAKES_LIMIT: usize = 5;
/// Conversation matches fetched for analysis.
pub const ANALYSIS_SEARCH_LIMIT: usize = 50;
/// Prior mistakes fetched for analysis.
pub const ANALYSIS_MISTAKES_LIMIT: usize = 20;

/// Merged bundle of upstream lookup results for one request.
///
/// Each field is independently empty when its lookup failed or timed out;
/// partial data is valid data.
#[derive(Debug, Clone, Default)]
pub struct AggregatedContext {
    pub conversations: Vec<ConversationMatch>,
    /// Highest relevance score among the matches.
    pub top_score: f32,
    pub profile: Vec<ProfileFact>,
    pub prior_mistakes: Vec<IncorrectAttempt>,
}

impl AggregatedContext {
    /// User and assistant message contents across all matches, in match
    /// order.
    pub fn context_messages(&self) -> Vec<String> {
        self.conversations
            .iter()
            .flat_map(|c| c.messages.iter())
            .filter(|m| matches!(m.role, MessageRole::User | MessageRole::Assistant))
            .map(|m| m.content.clone())
            .collect()
    }

    /// Every message content across all matches, system turns included.
    /// Analysis works over the full history.
    pub fn all_messages(&self) -> Vec<String> {
        self.conversations
            .iter()
            .flat_map(|c| c.messages.iter())
            .map(|m| m.content.clone())
            .collect()
    }
}

/// Coordinates the concurrent upstream lookups for one request.
pub struct FanOutCoordinator {
    store: Arc<dyn MemoryStore>,
    /// Deadline applied to each individual lookup.
    lookup_timeout: Duration,
}

impl FanOutCoordinator {
    pub fn new(store: Arc<dyn MemoryStore>, lookup_timeout: Duration) -> Self {
        Self {
            store,
            lookup_timeout,
        }
    }

    /// Gather chat context: conversation search (required), profile and
    /// prior mistakes (optional).
    pub async fn chat_context(
        &self,
        query: &str,
        user_id: &str,
    ) -> RecallResult<AggregatedContext> {
        let (search, profile, mistakes) = tokio::join!(
            timeout(
                self.lookup_timeout,
                self.store.search_conversations(query, CHAT_SEARCH_LIMIT),
            ),
            timeout(self.lookup_timeout, self.store.get_profile(user_id)),
            timeout(
                self.lookup_timeout,
                self.store
                    .get_incorrect_attempts(user_id, CHAT_MISTAKES_LIMIT),
            ),
        );

        // The conversation search is the one lookup chat cannot proceed
        // without.
        let conversations = match search {
            Ok(result) => result?,
            Err(_) => {
                return Err(RecallError::upstream_timeout(
                    "conversation search timed out",
                ))
            }
        };

        Ok(AggregatedContext {
            top_score: top_score(&conversations),
            conversations,
            profile: Self::absorb("profile", profile),
            prior_mistakes: Self::absorb("incorrect attempts", mistakes),
        })
    }

    /// Gather analysis context: broad history and prior mistakes, both
    /// optional, each degrading to empty on failure.
    pub async fn analysis_context(&self, user_id: &str) -> RecallResult<AggregatedContext> {
        let (history, mistakes) = tokio::join!(
            timeout(
                self.lookup_timeout,
                self.store
                    .search_conversations(user_id, ANALYSIS_SEARCH_LIMIT),
            ),
            timeout(
                self.lookup_timeout,
                self.store
                    .get_incorrect_attempts(user_id, ANALYSIS_MISTAKES_LIMIT),
            ),
        );

        let conversations = Self::absorb("conversation history", history);

        Ok(AggregatedContext {
            top_score: top_score(&conversations),
            conversations,
            profile: Vec::new(),
            prior_mistakes: Self::absorb("incorrect attempts", mistakes),
        })
    }

    /// Collapse an optional lookup outcome to its value or empty,
    /// logging the failure it absorbs.
    fn absorb<T>(
        name: &str,
        outcome: Result<RecallResult<Vec<T>>, tokio::time::error::Elapsed>,
    ) -> Vec<T> {
        match outcome {
            Ok(Ok(values)) => values,
            Ok(Err(e)) => {
                warn!(lookup = name, error = %e, "Optional lookup failed, degrading to empty");
                Vec::new()
            }
            Err(_) => {
                warn!(lookup = name, "Optional lookup timed out, degrading to empty");
                Vec::new()
            }
        }
    }
}

fn top_score(matches: &[ConversationMatch]) -> f32 {
    matches.iter().map(|m| m.score).fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockMemoryStore;
    use crate::types::ChatMessage;
    use chrono::Utc;

    fn conv(id: &str, score: f32) -> ConversationMatch {
        ConversationMatch {
            conversation_id: id.to_string(),
            score,
            timestamp: Utc::now(),
            messages: vec![ChatMessage::user("hello"), ChatMessage::assistant("hi")],
        }
    }

    fn fact() -> ProfileFact {
        ProfileFact {
            id: "f1".to_string(),
            user_id: "u1".to_string(),
            content: "allergic to peanuts".to_string(),
            category: "allergy".to_string(),
            importance: "high".to_string(),
        }
    }

    #[tokio::test]
    async fn test_optional_failure_degrades_to_empty() {
        let mut store = MockMemoryStore::new();
        store
            .expect_search_conversations()
            .returning(|_, _| Ok(vec![conv("c1", 0.9), conv("c2", 0.4)]));
        // Lookup #2 (profile) is optional and fails.
        store
            .expect_get_profile()
            .returning(|_| Err(RecallError::upstream("store unreachable")));
        store
            .expect_get_incorrect_attempts()
            .returning(|_, _| Ok(vec![]));

        let coordinator =
            FanOutCoordinator::new(Arc::new(store), Duration::from_secs(5));
        let ctx = coordinator.chat_context("hello", "u1").await.unwrap();

        assert_eq!(ctx.conversations.len(), 2);
        assert!((ctx.top_score - 0.9).abs() < f32::EPSILON);
        assert!(ctx.profile.is_empty());
        assert!(ctx.prior_mistakes.is_empty());
    }

    #[tokio::test]
    async fn test_required_search_failure_errors() {
        let mut store = MockMemoryStore::new();
        store
            .expect_search_conversations()
            .returning(|_, _| Err(RecallError::upstream("store unreachable")));
        store.expect_get_profile().returning(|_| Ok(vec![fact()]));
        store
            .expect_get_incorrect_attempts()
            .returning(|_, _| Ok(vec![]));

        let coordinator =
            FanOutCoordinator::new(Arc::new(store), Duration::from_secs(5));
        let result = coordinator.chat_context("hello", "u1").await;

        assert!(matches!(result, Err(RecallError::Upstream { .. })));
    }

    #[tokio::test]
    async fn test_analysis_both_lookups_optional() {
        let mut store = MockMemoryStore::new();
        store
            .expect_search_conversations()
            .returning(|_, _| Err(RecallError::upstream("store unreachable")));
        store
            .expect_get_incorrect_attempts()
            .returning(|_, _| Err(RecallError::upstream("store unreachable")));

        let coordinator =
            FanOutCoordinator::new(Arc::new(store), Duration::from_secs(5));
        let ctx = coordinator.analysis_context("u1").await.unwrap();

        assert!(ctx.conversations.is_empty());
        assert!(ctx.prior_mistakes.is_empty());
    }

    #[tokio::test]
    async fn test_context_messages_skip_system_turns() {
        let mut m = conv("c1", 0.5);
        m.messages.insert(0, ChatMessage::system("internal note"));
        let ctx = AggregatedContext {
            conversations: vec![m],
            top_score: 0.5,
            profile: vec![],
            prior_mistakes: vec![],
        };

        let messages = ctx.context_messages();
        assert_eq!(messages, vec!["hello".to_string(), "hi".to_string()]);

        let all = ctx.all_messages();
        assert_eq!(
            all,
            vec![
                "internal note".to_string(),
                "hello".to_string(),
                "hi".to_string()
            ]
        );
    }
}
