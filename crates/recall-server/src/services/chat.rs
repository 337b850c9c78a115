//! Chat orchestration.
//!
//! One chat turn: gather memory context, generate the assistant reply,
//! respond, then judge and persist the exchange on a detached task so
//! the caller never waits on the write path.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::warn;
use uuid::Uuid;

use recall_core::error::RecallResult;
use recall_core::fanout::FanOutCoordinator;
use recall_core::scoring::ScoringEngine;
use recall_core::spawn_detached;
use recall_core::traits::{CompletionOptions, CompletionProvider, MemoryStore};
use recall_core::types::{ChatMessage, RecordKind, SaveMetadata, SaveRecord};
use recall_llm::{parse_quality_response, prompts};

/// Max tokens for the structured quality-judge completion.
const QUALITY_JUDGE_MAX_TOKENS: u32 = 500;

/// Context summary echoed back to the client.
#[derive(Debug, Serialize)]
pub struct ContextUsed {
    pub total: usize,
    pub top_score: f32,
}

/// Response payload for one chat turn.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub conversation_id: String,
    pub message: String,
    pub response: String,
    pub context_used: ContextUsed,
    pub created_at: DateTime<Utc>,
}

/// A processed chat turn plus the handle of its detached save.
///
/// Request paths drop the handle; tests await it.
pub struct ProcessedChat {
    pub response: ChatResponse,
    pub save: JoinHandle<()>,
}

/// Orchestrates memory-augmented chat turns.
pub struct ChatService {
    fanout: FanOutCoordinator,
    store: Arc<dyn MemoryStore>,
    completion: Arc<dyn CompletionProvider>,
    scoring: ScoringEngine,
    save_timeout: Duration,
}

impl ChatService {
    pub fn new(
        store: Arc<dyn MemoryStore>,
        completion: Arc<dyn CompletionProvider>,
        scoring: ScoringEngine,
        lookup_timeout: Duration,
        save_timeout: Duration,
    ) -> Self {
        Self {
            fanout: FanOutCoordinator::new(store.clone(), lookup_timeout),
            store,
            completion,
            scoring,
            save_timeout,
        }
    }

    /// Process one chat turn.
    ///
    /// The conversation search is required; profile and prior mistakes
    /// degrade to empty. The reply is returned before any persistence
    /// happens.
    pub async fn process(
        &self,
        user_id: &str,
        message: &str,
        conversation_id: Option<String>,
    ) -> RecallResult<ProcessedChat> {
        let ctx = self.fanout.chat_context(message, user_id).await?;
        let context_lines = ctx.context_messages();

        let mut messages = vec![ChatMessage::system(prompts::chat_system_prompt(
            &ctx.profile,
            &ctx.prior_mistakes,
        ))];
        if let Some(context) = prompts::chat_context_message(&context_lines) {
            messages.push(ChatMessage::assistant(context));
        }
        messages.push(ChatMessage::user(message));

        let reply = self.completion.complete(&messages, None).await?;

        let conversation_id =
            conversation_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let created_at = Utc::now();

        let save = self.spawn_save(
            conversation_id.clone(),
            user_id.to_string(),
            message.to_string(),
            reply.clone(),
            context_lines,
        );

        Ok(ProcessedChat {
            response: ChatResponse {
                conversation_id,
                message: message.to_string(),
                response: reply,
                context_used: ContextUsed {
                    total: ctx.conversations.len(),
                    top_score: ctx.top_score,
                },
                created_at,
            },
            save,
        })
    }

    /// Judge the user turn's quality and persist both turns, detached
    /// from the request.
    fn spawn_save(
        &self,
        conversation_id: String,
        user_id: String,
        user_turn: String,
        assistant_turn: String,
        context_lines: Vec<String>,
    ) -> JoinHandle<()> {
        let store = self.store.clone();
        let completion = self.completion.clone();
        let scoring = self.scoring.clone();

        spawn_detached("chat save", self.save_timeout, async move {
            let judge_messages = vec![
                ChatMessage::system(prompts::quality_system_prompt()),
                ChatMessage::user(prompts::quality_user_prompt(&user_turn, &context_lines)),
            ];

            let quality = match completion
                .complete(
                    &judge_messages,
                    Some(CompletionOptions::structured(QUALITY_JUDGE_MAX_TOKENS)),
                )
                .await
            {
                Ok(text) => parse_quality_response(&text)
                    .map(|s| scoring.clamp_quality(s))
                    .unwrap_or_else(|| scoring.default_quality()),
                Err(e) => {
                    warn!(error = %e, "Quality judge failed, using default score");
                    scoring.default_quality()
                }
            };

            let record = SaveRecord {
                conversation_id,
                messages: vec![
                    ChatMessage::user(user_turn),
                    ChatMessage::assistant(assistant_turn),
                ],
                metadata: Some(SaveMetadata {
                    source: Some("chat".to_string()),
                    session_id: Some(user_id),
                    kind: Some(RecordKind::Chat),
                    quality_score: Some(quality),
                    ..Default::default()
                }),
            };

            store.save_conversation(&record).await?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_core::error::RecallError;
    use recall_core::scoring::ScoringConfig;
    use recall_core::types::ConversationMatch;
    use recall_core::{MockCompletionProvider, MockMemoryStore};

    fn conv(id: &str, score: f32) -> ConversationMatch {
        ConversationMatch {
            conversation_id: id.to_string(),
            score,
            timestamp: Utc::now(),
            messages: vec![
                ChatMessage::user("I planted tomatoes yesterday"),
                ChatMessage::assistant("That sounds lovely!"),
            ],
        }
    }

    fn service(
        store: MockMemoryStore,
        completion: MockCompletionProvider,
    ) -> ChatService {
        ChatService::new(
            Arc::new(store),
            Arc::new(completion),
            ScoringEngine::new(ScoringConfig::default()),
            Duration::from_secs(5),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_process_returns_reply_and_persists_with_quality() {
        let mut store = MockMemoryStore::new();
        store
            .expect_search_conversations()
            .returning(|_, _| Ok(vec![conv("c1", 0.9)]));
        store.expect_get_profile().returning(|_| Ok(vec![]));
        store
            .expect_get_incorrect_attempts()
            .returning(|_, _| Ok(vec![]));
        store
            .expect_save_conversation()
            .withf(|record: &SaveRecord| {
                let meta = record.metadata.as_ref().unwrap();
                record.messages.len() == 2
                    && meta.quality_score == Some(80)
                    && meta.session_id.as_deref() == Some("u1")
            })
            .times(1)
            .returning(|_| Ok("stored-1".to_string()));

        let mut completion = MockCompletionProvider::new();
        // First call generates the reply, second judges quality.
        completion
            .expect_complete()
            .times(1)
            .returning(|_, _| Ok("How nice! Did the tomatoes do well?".to_string()));
        completion
            .expect_complete()
            .times(1)
            .returning(|_, _| Ok(r#"{"score": 80, "reasoning": "coherent"}"#.to_string()));

        let service = service(store, completion);
        let processed = service
            .process("u1", "I watered the garden", None)
            .await
            .unwrap();

        assert_eq!(processed.response.context_used.total, 1);
        assert!((processed.response.context_used.top_score - 0.9).abs() < f32::EPSILON);
        assert!(!processed.response.conversation_id.is_empty());

        processed.save.await.unwrap();
    }

    #[tokio::test]
    async fn test_unparseable_quality_falls_back_to_default() {
        let mut store = MockMemoryStore::new();
        store
            .expect_search_conversations()
            .returning(|_, _| Ok(vec![conv("c1", 0.5)]));
        store.expect_get_profile().returning(|_| Ok(vec![]));
        store
            .expect_get_incorrect_attempts()
            .returning(|_, _| Ok(vec![]));
        store
            .expect_save_conversation()
            .withf(|record: &SaveRecord| {
                record.metadata.as_ref().and_then(|m| m.quality_score) == Some(50)
            })
            .times(1)
            .returning(|_| Ok("stored-1".to_string()));

        let mut completion = MockCompletionProvider::new();
        completion
            .expect_complete()
            .times(1)
            .returning(|_, _| Ok("Hello!".to_string()));
        completion
            .expect_complete()
            .times(1)
            .returning(|_, _| Ok("I cannot rate this.".to_string()));

        let service = service(store, completion);
        let processed = service.process("u1", "hello", None).await.unwrap();
        processed.save.await.unwrap();
    }

    #[tokio::test]
    async fn test_required_search_failure_skips_completion() {
        let mut store = MockMemoryStore::new();
        store
            .expect_search_conversations()
            .returning(|_, _| Err(RecallError::upstream("store unreachable")));
        store.expect_get_profile().returning(|_| Ok(vec![]));
        store
            .expect_get_incorrect_attempts()
            .returning(|_, _| Ok(vec![]));

        let mut completion = MockCompletionProvider::new();
        completion.expect_complete().times(0);

        let service = service(store, completion);
        let result = service.process("u1", "hello", None).await;

        assert!(matches!(result, Err(RecallError::Upstream { .. })));
    }

    #[tokio::test]
    async fn test_supplied_conversation_id_is_kept() {
        let mut store = MockMemoryStore::new();
        store
            .expect_search_conversations()
            .returning(|_, _| Ok(vec![conv("c1", 0.5)]));
        store.expect_get_profile().returning(|_| Ok(vec![]));
        store
            .expect_get_incorrect_attempts()
            .returning(|_, _| Ok(vec![]));
        store
            .expect_save_conversation()
            .returning(|_| Ok("stored-1".to_string()));

        let mut completion = MockCompletionProvider::new();
        completion
            .expect_complete()
            .returning(|_, _| Ok(r#"{"score": 70}"#.to_string()));

        let service = service(store, completion);
        let processed = service
            .process("u1", "hello", Some("conv-42".to_string()))
            .await
            .unwrap();

        assert_eq!(processed.response.conversation_id, "conv-42");
        processed.save.await.unwrap();
    }
}
