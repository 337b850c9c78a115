//! Health check endpoint.

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::envelope::ApiEnvelope;
use crate::error::ApiResult;
use crate::middleware::RequestId;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub memory_store: String,
}

/// Health check endpoint.
/// GET /health
pub async fn health_check(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> ApiResult<Json<ApiEnvelope<HealthData>>> {
    let memory_store = match state.store.health_check().await {
        Ok(true) => "ok",
        Ok(false) => "degraded",
        Err(_) => "unreachable",
    };

    Ok(ApiEnvelope::ok(
        HealthData {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            memory_store: memory_store.to_string(),
        },
        request_id.0,
    ))
}
