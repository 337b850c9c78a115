//! recall-llm - Completion provider, prompts, and response parsing.
//!
//! Wraps the OpenAI chat completion API behind the
//! [`CompletionProvider`](recall_core::traits::CompletionProvider) trait
//! and provides the prompt templates plus JSON extraction used by the
//! chat, game, and analysis services.

pub mod json;
pub mod openai;
pub mod prompts;

pub use json::{
    extract_json, parse_domain_scores, parse_quality_response, parse_question_payload,
    QuestionPayload,
};
pub use openai::{OpenAiLlmConfig, OpenAiProvider};
