//! Analysis endpoints.

use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use crate::envelope::ApiEnvelope;
use crate::error::{ApiError, ApiResult};
use crate::middleware::RequestId;
use crate::services::{AnalysisResponse, ReportResponse};
use crate::state::AppState;
use recall_core::types::DomainScore;

/// Request body for analysis.
#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    pub user_id: String,
}

/// Request body for report generation from existing scores.
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub domains: Vec<DomainScore>,
}

/// Full analysis: domain scores plus report.
/// POST /api/analysis
pub async fn analyze(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<AnalysisRequest>,
) -> ApiResult<Json<ApiEnvelope<AnalysisResponse>>> {
    if request.user_id.trim().is_empty() {
        return Err(
            ApiError::invalid_request("user_id is required").with_request_id(request_id.0)
        );
    }

    let response = state
        .analysis
        .analyze(&request.user_id)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(request_id.0.clone()))?;

    Ok(ApiEnvelope::ok(response, request_id.0))
}

/// Domain scores only.
/// POST /api/analysis/domains
pub async fn analyze_domains(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<AnalysisRequest>,
) -> ApiResult<Json<ApiEnvelope<AnalysisResponse>>> {
    if request.user_id.trim().is_empty() {
        return Err(
            ApiError::invalid_request("user_id is required").with_request_id(request_id.0)
        );
    }

    let response = state
        .analysis
        .analyze_domains_only(&request.user_id)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(request_id.0.clone()))?;

    Ok(ApiEnvelope::ok(response, request_id.0))
}

/// Report from caller-supplied domain scores.
/// POST /api/analysis/report
pub async fn generate_report(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<ReportRequest>,
) -> ApiResult<Json<ApiEnvelope<ReportResponse>>> {
    let response = state
        .analysis
        .generate_report_only(request.domains)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(request_id.0.clone()))?;

    Ok(ApiEnvelope::ok(response, request_id.0))
}
