use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::gateway::{
    state::AppState,
    types::{ApiError, error_codes},
};

/// Require `Authorization: Bearer <jwt>` for an existing, active seller and
/// inject the verified [`Claims`]
///
/// [`Claims`]: super::service::Claims
pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Extract Authorization header
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            ApiError::unauthorized(error_codes::MISSING_AUTH, "Missing Authorization header")
        })?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized(error_codes::AUTH_FAILED, "Invalid token format"))?;

    // 2. Verify token
    let claims = state.user_auth.verify_token(token).map_err(|_| {
        ApiError::unauthorized(error_codes::AUTH_FAILED, "Invalid or expired token")
    })?;

    // 3. Tokens outlive deactivation; check the seller on every request
    let seller_id = claims
        .seller_id()
        .ok_or_else(|| ApiError::unauthorized(error_codes::AUTH_FAILED, "Invalid token subject"))?;
    let seller = state.sellers.store().get_seller(seller_id).await?;
    match seller {
        None => {
            return Err(ApiError::unauthorized(
                error_codes::AUTH_FAILED,
                "Seller not found",
            ));
        }
        Some(seller) if !seller.is_active => {
            return Err(ApiError::unauthorized(
                error_codes::AUTH_FAILED,
                "User is inactive",
            ));
        }
        Some(_) => {}
    }

    // 4. Inject claims
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Require `X-Admin-Secret` to match the configured admin secret
pub async fn admin_secret_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(ADMIN_SECRET_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized(error_codes::MISSING_AUTH, "Missing admin secret"))?;

    if !secret_matches(provided, &state.admin_secret) {
        return Err(ApiError::forbidden("Invalid admin secret"));
    }
    Ok(next.run(request).await)
}

/// Byte comparison whose timing does not depend on where the inputs differ
fn secret_matches(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";
