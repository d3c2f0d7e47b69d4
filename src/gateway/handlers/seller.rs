//! Seller-facing handlers (JWT protected)

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::core_types::SellerId;
use crate::gateway::state::AppState;
use crate::gateway::types::{AccountView, ApiError, ApiResponse, SellResponse, error_codes};
use crate::ledger::LedgerError;
use crate::spend::{SpendOutcome, SpendRequest};
use crate::user_auth::Claims;

const RECENT_TRANSACTIONS: i64 = 20;

fn seller_id(claims: &Claims) -> Result<SellerId, ApiError> {
    claims
        .seller_id()
        .ok_or_else(|| ApiError::unauthorized(error_codes::AUTH_FAILED, "Invalid token subject"))
}

/// A token whose seller was removed or deactivated after the middleware
/// check is an auth failure, not a 404 or 403
fn seller_gone(e: LedgerError) -> ApiError {
    match e {
        LedgerError::SellerNotFound(_) => {
            ApiError::unauthorized(error_codes::AUTH_FAILED, "Seller not found")
        }
        LedgerError::SellerInactive(_) => {
            ApiError::unauthorized(error_codes::AUTH_FAILED, "User is inactive")
        }
        other => other.into(),
    }
}

/// Sell credit
///
/// POST /api/v1/sell
#[utoipa::path(
    post,
    path = "/api/v1/sell",
    request_body = SpendRequest,
    responses(
        (status = 201, description = "Credit sold", body = ApiResponse<SellResponse>),
        (status = 400, description = "NEGATIVE_AMOUNT, INSUFFICIENT_BALANCE or field errors"),
        (status = 401, description = "Missing or invalid token, or seller inactive"),
        (status = 503, description = "Account busy, retry later")
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn sell(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<SpendRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<SellResponse>>), ApiError> {
    let seller_id = seller_id(&claims)?;
    let Json(request) = payload.map_err(|rejection| {
        ApiError::bad_request(error_codes::INVALID_PARAMETER, rejection.body_text())
    })?;

    match state
        .spend
        .handle_spend(seller_id, request)
        .await
        .map_err(seller_gone)?
    {
        SpendOutcome::Created(transaction) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(SellResponse {
                message: "Credit sold successfully.".to_string(),
                transaction,
            })),
        )),
        SpendOutcome::Rejected(reason) => Err(ApiError::rejected(reason)),
        SpendOutcome::InvalidInput(errors) => Err(ApiError::invalid_input(errors)),
    }
}

/// Current balance and latest transactions
///
/// GET /api/v1/account
#[utoipa::path(
    get,
    path = "/api/v1/account",
    responses(
        (status = 200, description = "Account view", body = ApiResponse<AccountView>),
        (status = 401, description = "Missing or invalid token, or seller inactive")
    ),
    security(("bearer_auth" = [])),
    tag = "Seller"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<AccountView>>, ApiError> {
    let seller_id = seller_id(&claims)?;
    let store = state.ledger.store();

    let account = store.get_account(seller_id).await.map_err(seller_gone)?;
    let recent_transactions = store
        .list_transactions(seller_id, Some(RECENT_TRANSACTIONS))
        .await
        .map_err(seller_gone)?;

    Ok(Json(ApiResponse::success(AccountView {
        seller_id: account.seller_id,
        username: account.username,
        credit: account.credit,
        recent_transactions,
    })))
}
