//! Chat endpoint.

use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use crate::envelope::ApiEnvelope;
use crate::error::{ApiError, ApiResult};
use crate::middleware::RequestId;
use crate::services::ChatResponse;
use crate::state::AppState;

/// Request body for a chat turn.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
    /// Continue an existing conversation when supplied.
    pub conversation_id: Option<String>,
}

/// Process one chat turn.
/// POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ApiEnvelope<ChatResponse>>> {
    if request.user_id.trim().is_empty() {
        return Err(
            ApiError::invalid_request("user_id is required").with_request_id(request_id.0)
        );
    }
    if request.message.trim().is_empty() {
        return Err(
            ApiError::invalid_request("message is required").with_request_id(request_id.0)
        );
    }

    let processed = state
        .chat
        .process(&request.user_id, &request.message, request.conversation_id)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(request_id.0.clone()))?;

    Ok(ApiEnvelope::ok(processed.response, request_id.0))
}
