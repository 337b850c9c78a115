//! recall-core - Core library for recall.
//!
//! This crate provides the types, scoring engine, question cache, and
//! fan-out coordination that the recall chat/game backend is built on.
//!
//! # Example
//!
//! ```ignore
//! use recall_core::{FanOutCoordinator, QuestionCache, ScoringEngine, ScoringConfig};
//!
//! let scoring = ScoringEngine::new(ScoringConfig::default());
//! let score = scoring.retention_score(true, 1200);
//! let next = scoring.next_difficulty(score);
//! ```

pub mod cache;
pub mod config;
pub mod detach;
pub mod error;
pub mod fanout;
pub mod scoring;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use cache::{CacheReaper, QuestionCache};
pub use config::AppConfig;
pub use detach::spawn_detached;
pub use error::{ErrorCode, RecallError, RecallResult};
pub use fanout::{AggregatedContext, FanOutCoordinator};
pub use scoring::{ScoringConfig, ScoringEngine};
pub use traits::{CompletionOptions, CompletionProvider, MemoryStore};
pub use types::{
    ChatMessage, Confidence, ConversationMatch, Difficulty, DomainScore, GeneratedQuestion,
    IncorrectAttempt,
    MemoryEvaluation, MessageRole, NextQuestionSuggestion, ProfileFact, QuestionBody,
    QuestionMetadata, QuestionOption, QuestionType, QuizInfo, RecordKind, SaveMetadata,
    SaveRecord, StoredQuestion,
};

#[cfg(any(test, feature = "mocks"))]
pub use traits::{MockCompletionProvider, MockMemoryStore};
