//! Health check handler

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use utoipa::ToSchema;

use crate::gateway::state::AppState;
use crate::gateway::types::{ApiError, ApiResponse, error_codes};

/// Health check response data
#[derive(serde::Serialize, ToSchema)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_i64)]
    pub timestamp_ms: i64,
    /// Ledger store backend
    #[schema(example = "postgres")]
    pub store: String,
    /// Build revision
    pub version: String,
}

/// Health check endpoint
///
/// - Healthy: 200 OK + {code: 0, data: {timestamp_ms, store, version}}
/// - Store unreachable: 503 Service Unavailable
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = ApiResponse<HealthResponse>, content_type = "application/json"),
        (status = 503, description = "Service unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ApiResponse<HealthResponse>>), ApiError> {
    if let Err(e) = state.ledger.store().health_check().await {
        tracing::error!(store = state.store_name(), error = %e, "[HEALTH] store check failed");
        return Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            error_codes::SERVICE_UNAVAILABLE,
            "unavailable",
        ));
    }

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(HealthResponse {
            timestamp_ms: Utc::now().timestamp_millis(),
            store: state.store_name().to_string(),
            version: env!("GIT_HASH").to_string(),
        })),
    ))
}
