//! Game endpoints: question generation and result submission.

use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use crate::envelope::ApiEnvelope;
use crate::error::{ApiError, ApiResult};
use crate::middleware::RequestId;
use crate::services::GameResultResponse;
use crate::state::AppState;
use recall_core::types::{Difficulty, GeneratedQuestion, QuestionType};

/// Request body for question generation.
#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub user_id: String,
    pub question_type: String,
    /// Optional difficulty hint; omitted means recency-derived.
    pub difficulty: Option<String>,
}

/// Request body for a submitted answer.
#[derive(Debug, Deserialize)]
pub struct ResultRequest {
    pub user_id: String,
    pub question_id: String,
    pub correct: bool,
    pub response_time_ms: i64,
}

fn parse_question_type(raw: &str) -> Result<QuestionType, ApiError> {
    match raw {
        "fill_in_blank" => Ok(QuestionType::FillInBlank),
        "multiple_choice" => Ok(QuestionType::MultipleChoice),
        other => Err(ApiError::invalid_question_type(format!(
            "unknown question_type '{}'; expected fill_in_blank or multiple_choice",
            other
        ))),
    }
}

fn parse_difficulty_hint(raw: Option<&str>) -> Result<Option<Difficulty>, ApiError> {
    match raw {
        None => Ok(None),
        Some("") => Ok(None),
        Some(s) => Difficulty::parse(s).map(Some).ok_or_else(|| {
            ApiError::invalid_request(format!(
                "unknown difficulty '{}'; expected easy, medium or hard",
                s
            ))
        }),
    }
}

/// Generate a question from conversation history.
/// POST /api/game/question
pub async fn generate_question(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<QuestionRequest>,
) -> ApiResult<Json<ApiEnvelope<GeneratedQuestion>>> {
    if request.user_id.trim().is_empty() {
        return Err(
            ApiError::invalid_request("user_id is required").with_request_id(request_id.0)
        );
    }

    let question_type = parse_question_type(&request.question_type)
        .map_err(|e| e.with_request_id(request_id.0.clone()))?;
    let hint = parse_difficulty_hint(request.difficulty.as_deref())
        .map_err(|e| e.with_request_id(request_id.0.clone()))?;

    let question = state
        .game
        .generate_question(&request.user_id, question_type, hint)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(request_id.0.clone()))?;

    Ok(ApiEnvelope::ok(question, request_id.0))
}

/// Score a submitted answer.
/// POST /api/game/result
pub async fn submit_result(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<ResultRequest>,
) -> ApiResult<Json<ApiEnvelope<GameResultResponse>>> {
    if request.user_id.trim().is_empty() {
        return Err(
            ApiError::invalid_request("user_id is required").with_request_id(request_id.0)
        );
    }
    if request.question_id.trim().is_empty() {
        return Err(
            ApiError::invalid_request("question_id is required").with_request_id(request_id.0)
        );
    }

    let evaluated = state
        .game
        .evaluate_result(
            &request.user_id,
            &request.question_id,
            request.correct,
            request.response_time_ms,
        )
        .await
        .map_err(|e| ApiError::from(e).with_request_id(request_id.0.clone()))?;

    Ok(ApiEnvelope::ok(evaluated.response, request_id.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_question_type() {
        assert_eq!(
            parse_question_type("fill_in_blank").unwrap(),
            QuestionType::FillInBlank
        );
        assert_eq!(
            parse_question_type("multiple_choice").unwrap(),
            QuestionType::MultipleChoice
        );

        let err = parse_question_type("essay").unwrap_err();
        assert_eq!(err.code, "INVALID_QUESTION_TYPE");
    }

    #[test]
    fn test_parse_difficulty_hint() {
        assert_eq!(parse_difficulty_hint(None).unwrap(), None);
        assert_eq!(parse_difficulty_hint(Some("")).unwrap(), None);
        assert_eq!(
            parse_difficulty_hint(Some("hard")).unwrap(),
            Some(Difficulty::Hard)
        );
        assert!(parse_difficulty_hint(Some("impossible")).is_err());
    }
}
