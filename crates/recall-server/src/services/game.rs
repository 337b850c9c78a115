//! Memory-game orchestration: question generation and result scoring.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use uuid::Uuid;

use recall_core::cache::QuestionCache;
use recall_core::error::{RecallError, RecallResult};
use recall_core::scoring::ScoringEngine;
use recall_core::spawn_detached;
use recall_core::traits::{CompletionOptions, CompletionProvider, MemoryStore};
use recall_core::types::{
    ChatMessage, Difficulty, GeneratedQuestion, MemoryEvaluation, NextQuestionSuggestion,
    QuestionBody, QuestionMetadata, QuestionType, RecordKind, SaveMetadata, SaveRecord,
    StoredQuestion,
};
use recall_llm::{parse_question_payload, prompts};

/// Conversation matches fetched for question generation.
const GAME_SEARCH_LIMIT: usize = 20;
/// Topic derived from a conversation is truncated to this many characters.
const TOPIC_MAX_CHARS: usize = 50;
/// Topic used when the evaluated question is no longer cached.
const FALLBACK_TOPIC: &str = "general";
/// Max tokens for the structured question-generation completion.
const QUESTION_MAX_TOKENS: u32 = 1000;

/// Response payload for a submitted game result.
#[derive(Debug, Serialize)]
pub struct GameResultResponse {
    pub result_id: String,
    pub memory_evaluation: MemoryEvaluation,
    pub next_question_suggestion: NextQuestionSuggestion,
    pub stored_at: DateTime<Utc>,
}

/// An evaluated result plus the handle of its detached save.
pub struct EvaluatedResult {
    pub response: GameResultResponse,
    pub save: JoinHandle<()>,
}

/// Orchestrates the memory game.
pub struct GameService {
    store: Arc<dyn MemoryStore>,
    completion: Arc<dyn CompletionProvider>,
    cache: Arc<QuestionCache>,
    scoring: ScoringEngine,
    min_conversations: usize,
    save_timeout: Duration,
}

impl GameService {
    pub fn new(
        store: Arc<dyn MemoryStore>,
        completion: Arc<dyn CompletionProvider>,
        cache: Arc<QuestionCache>,
        scoring: ScoringEngine,
        min_conversations: usize,
        save_timeout: Duration,
    ) -> Self {
        Self {
            store,
            completion,
            cache,
            scoring,
            min_conversations,
            save_timeout,
        }
    }

    /// Generate a question from the user's conversation history.
    ///
    /// Fails with `InsufficientData` before any completion call when the
    /// history is below the configured minimum.
    pub async fn generate_question(
        &self,
        user_id: &str,
        question_type: QuestionType,
        difficulty_hint: Option<Difficulty>,
    ) -> RecallResult<GeneratedQuestion> {
        let matches = self
            .store
            .search_conversations(user_id, GAME_SEARCH_LIMIT)
            .await?;

        if matches.len() < self.min_conversations {
            return Err(RecallError::InsufficientData {
                needed: self.min_conversations,
                got: matches.len(),
            });
        }

        let now = Utc::now();
        let session_difficulty = self
            .scoring
            .determine_difficulty(difficulty_hint, &matches, now);

        let top = matches
            .iter()
            .max_by(|a, b| {
                a.score
                    .partial_cmp(&b.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .ok_or_else(|| RecallError::internal("no conversation match to question"))?;

        let topic = top
            .messages
            .first()
            .map(|m| m.content.chars().take(TOPIC_MAX_CHARS).collect::<String>())
            .unwrap_or_else(|| FALLBACK_TOPIC.to_string());
        let content = top.content();

        let (system, user) = match question_type {
            QuestionType::FillInBlank => (
                prompts::fill_in_blank_system_prompt(),
                prompts::fill_in_blank_user_prompt(&content, &topic, session_difficulty.as_str()),
            ),
            QuestionType::MultipleChoice => (
                prompts::multiple_choice_system_prompt(),
                prompts::multiple_choice_user_prompt(&content, &topic, session_difficulty.as_str()),
            ),
        };

        let text = self
            .completion
            .complete(
                &[ChatMessage::system(system), ChatMessage::user(user)],
                Some(CompletionOptions::structured(QUESTION_MAX_TOKENS)),
            )
            .await?;

        let payload = parse_question_payload(&text)?;

        let days = top.days_since(now);
        let difficulty = self.scoring.difficulty_from_age(days);

        let body = QuestionBody {
            question_id: Uuid::new_v4().to_string(),
            question: payload.question,
            options: payload.options,
            correct_answer: payload.correct_answer,
            based_on_conversation: top.conversation_id.clone(),
            difficulty,
            metadata: QuestionMetadata {
                topic: topic.clone(),
                memory_score: top.score,
                days_since_conversation: days,
            },
        };

        let question = match question_type {
            QuestionType::FillInBlank => GeneratedQuestion::FillInBlank(body),
            QuestionType::MultipleChoice => GeneratedQuestion::MultipleChoice(body),
        };

        self.cache
            .put(StoredQuestion {
                question_id: question.id().to_string(),
                user_id: user_id.to_string(),
                question_type,
                topic,
                difficulty,
                created_at: now,
                expires_at: now,
            })
            .await;

        Ok(question)
    }

    /// Score a submitted answer and suggest the next question.
    ///
    /// A cache miss on the question id is tolerated; the evaluation then
    /// carries the fallback topic.
    pub async fn evaluate_result(
        &self,
        user_id: &str,
        question_id: &str,
        correct: bool,
        response_time_ms: i64,
    ) -> RecallResult<EvaluatedResult> {
        let score = self.scoring.retention_score(correct, response_time_ms);

        let topic = self
            .cache
            .get(question_id)
            .await
            .map(|q| q.topic)
            .unwrap_or_else(|| FALLBACK_TOPIC.to_string());

        let evaluation = MemoryEvaluation {
            topic: topic.clone(),
            retention_score: score,
            confidence: self.scoring.confidence(score),
            recommendation: self.scoring.recommendation(score).to_string(),
        };
        let suggestion = NextQuestionSuggestion {
            difficulty: self.scoring.next_difficulty(score),
            topic_preference: topic.clone(),
        };

        let result_id = Uuid::new_v4().to_string();
        let stored_at = Utc::now();

        let save = self.spawn_save(
            result_id.clone(),
            user_id.to_string(),
            question_id.to_string(),
            topic,
            score,
        );

        Ok(EvaluatedResult {
            response: GameResultResponse {
                result_id,
                memory_evaluation: evaluation,
                next_question_suggestion: suggestion,
                stored_at,
            },
            save,
        })
    }

    fn spawn_save(
        &self,
        result_id: String,
        user_id: String,
        question_id: String,
        topic: String,
        score: f32,
    ) -> JoinHandle<()> {
        let store = self.store.clone();

        spawn_detached("evaluation save", self.save_timeout, async move {
            let record = SaveRecord {
                conversation_id: result_id,
                messages: vec![ChatMessage::system(format!(
                    "memory evaluation: topic '{}', retention score {:.2}",
                    topic, score
                ))],
                metadata: Some(SaveMetadata {
                    source: Some("game".to_string()),
                    session_id: Some(user_id),
                    kind: Some(RecordKind::MemoryEvaluation),
                    retention_score: Some(score),
                    question_id: Some(question_id),
                    ..Default::default()
                }),
            };

            store.save_conversation(&record).await?;
            Ok(())
        })
    }
}
