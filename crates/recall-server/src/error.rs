//! Error handling for the REST API server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;
use uuid::Uuid;

use crate::envelope::ApiEnvelope;
use recall_core::error::RecallError;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            request_id: None,
        }
    }

    /// Attach the request id the envelope metadata should carry.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    // Common error constructors
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message)
    }

    pub fn invalid_question_type(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_QUESTION_TYPE", message)
    }

    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "INSUFFICIENT_DATA",
            message,
        )
    }

    pub fn generation_failed(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "GENERATION_FAILED", message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = self
            .request_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let body = ApiEnvelope::err(self.code, self.message, request_id);

        (self.status, Json(body)).into_response()
    }
}

// Convert from recall-core errors
impl From<RecallError> for ApiError {
    fn from(err: RecallError) -> Self {
        match err {
            RecallError::Upstream { message, .. } => {
                ApiError::upstream(format!("Memory store error: {}", message))
            }
            RecallError::Completion { message, .. } => {
                ApiError::generation_failed(format!("Completion error: {}", message))
            }
            RecallError::Parse { message, .. } => {
                ApiError::generation_failed(format!("Malformed completion response: {}", message))
            }
            RecallError::Validation { message, .. } => ApiError::invalid_request(message),
            RecallError::InsufficientData { needed, got } => ApiError::insufficient_data(format!(
                "not enough conversation history: need at least {}, got {}",
                needed, got
            )),
            RecallError::Configuration(msg) => ApiError::internal(msg),
            RecallError::Serialization(e) => {
                ApiError::internal(format!("Serialization error: {}", e))
            }
            RecallError::Io(e) => ApiError::internal(format!("IO error: {}", e)),
            RecallError::Internal(msg) => ApiError::internal(msg),
        }
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_maps_to_422() {
        let err = ApiError::from(RecallError::InsufficientData { needed: 5, got: 2 });
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code, "INSUFFICIENT_DATA");
        assert!(err.message.contains("at least 5"));
    }

    #[test]
    fn test_upstream_maps_to_502() {
        let err = ApiError::from(RecallError::upstream("connection refused"));
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.code, "UPSTREAM_ERROR");
    }

    #[test]
    fn test_parse_maps_to_generation_failed() {
        let err = ApiError::from(RecallError::missing_field("correct_answer"));
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(err.code, "GENERATION_FAILED");
    }
}
