//! Core value types.

mod analysis;
mod conversation;
mod question;

pub use analysis::{DomainScore, ANALYSIS_DOMAINS};
pub use conversation::{
    ChatMessage, ConversationMatch, IncorrectAttempt, MessageRole, ProfileFact, QuizInfo,
    RecordKind, SaveMetadata, SaveRecord,
};
pub use question::{
    Confidence, Difficulty, GeneratedQuestion, MemoryEvaluation, NextQuestionSuggestion,
    QuestionBody, QuestionMetadata, QuestionOption, QuestionType, StoredQuestion,
};
