use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::service::{AuthError, TokenRequest, TokenResponse};
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiError, ApiResponse, error_codes};

/// Obtain a token
///
/// POST /api/v1/auth/token
#[utoipa::path(
    post,
    path = "/api/v1/auth/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = ApiResponse<TokenResponse>),
        (status = 401, description = "Invalid credentials or disabled seller"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn obtain_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TokenRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TokenResponse>>), ApiError> {
    match state.user_auth.login(&req).await {
        Ok(resp) => Ok((StatusCode::OK, Json(ApiResponse::success(resp)))),
        Err(e @ (AuthError::InvalidCredentials | AuthError::Inactive)) => {
            tracing::warn!(username = %req.username, error = %e, "Login failed");
            Err(ApiError::unauthorized(
                error_codes::AUTH_FAILED,
                "Unable to log in with provided credentials.",
            ))
        }
        Err(e) => {
            tracing::error!(username = %req.username, error = %e, "Login errored");
            Err(ApiError::internal("Login failed"))
        }
    }
}
