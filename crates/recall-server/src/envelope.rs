//! Uniform response envelope.
//!
//! Every response, success or failure, carries `{success, data|error,
//! metadata{timestamp, request_id}}`.

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Response metadata stamped on every envelope.
#[derive(Debug, Serialize)]
pub struct ResponseMetadata {
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
}

impl ResponseMetadata {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            request_id: request_id.into(),
        }
    }
}

/// Error payload of a failed envelope.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// The API envelope.
#[derive(Debug, Serialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    pub metadata: ResponseMetadata,
}

impl<T: Serialize> ApiEnvelope<T> {
    /// Build a success envelope.
    pub fn ok(data: T, request_id: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
            metadata: ResponseMetadata::new(request_id),
        })
    }
}

impl ApiEnvelope<()> {
    /// Build a failure envelope.
    pub fn err(
        code: impl Into<String>,
        message: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: code.into(),
                message: message.into(),
            }),
            metadata: ResponseMetadata::new(request_id),
        }
    }
}
