//! Back-office handlers (`X-Admin-Secret` protected)
//!
//! Read-only views over sellers and their ledgers, plus the write paths:
//! registering a seller, toggling its `is_active` / `is_staff` flags and
//! charging credit. Nothing edits or deletes an existing transaction, and no
//! route sets `credit` directly.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use validator::Validate;

use crate::core_types::SellerId;
use crate::gateway::state::AppState;
use crate::gateway::types::{
    ApiError, ApiResponse, ChargeRequest, ListQuery, RegisterSellerRequest, error_codes,
};
use crate::ledger::{AuditReport, Transaction};
use crate::seller::{Seller, SellerUpdate};
use crate::spend::{FieldErrors, collect_validation_errors};

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| {
            ApiError::bad_request(error_codes::INVALID_PARAMETER, rejection.body_text())
        })
}

/// Register a seller
///
/// POST /api/v1/admin/sellers
#[utoipa::path(
    post,
    path = "/api/v1/admin/sellers",
    request_body = RegisterSellerRequest,
    responses(
        (status = 201, description = "Seller created", body = ApiResponse<Seller>),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username taken")
    ),
    security(("admin_secret" = [])),
    tag = "Admin"
)]
pub async fn create_seller(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterSellerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Seller>>), ApiError> {
    let req = json_body(payload)?;
    if let Err(e) = req.validate() {
        let mut errors = FieldErrors::new();
        collect_validation_errors(&mut errors, &e);
        return Err(ApiError::invalid_input(errors));
    }

    let seller = state
        .sellers
        .register(
            &req.username,
            req.password.as_deref(),
            req.credit,
            req.is_staff,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(seller))))
}

/// List sellers
///
/// GET /api/v1/admin/sellers
#[utoipa::path(
    get,
    path = "/api/v1/admin/sellers",
    params(ListQuery),
    responses(
        (status = 200, description = "Sellers by id", body = ApiResponse<Vec<Seller>>)
    ),
    security(("admin_secret" = [])),
    tag = "Admin"
)]
pub async fn list_sellers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Seller>>>, ApiError> {
    let sellers = state.sellers.store().list_sellers(query.limit()).await?;
    Ok(Json(ApiResponse::success(sellers)))
}

/// Get one seller
///
/// GET /api/v1/admin/sellers/{seller_id}
#[utoipa::path(
    get,
    path = "/api/v1/admin/sellers/{seller_id}",
    params(("seller_id" = i64, Path, description = "Seller id")),
    responses(
        (status = 200, description = "Seller", body = ApiResponse<Seller>),
        (status = 404, description = "Unknown seller")
    ),
    security(("admin_secret" = [])),
    tag = "Admin"
)]
pub async fn get_seller(
    State(state): State<Arc<AppState>>,
    Path(seller_id): Path<SellerId>,
) -> Result<Json<ApiResponse<Seller>>, ApiError> {
    let seller = state
        .sellers
        .store()
        .get_seller(seller_id)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(
                error_codes::SELLER_NOT_FOUND,
                format!("Seller not found: {}", seller_id),
            )
        })?;
    Ok(Json(ApiResponse::success(seller)))
}

/// Activate, deactivate or change the staff flag of a seller
///
/// PATCH /api/v1/admin/sellers/{seller_id}
///
/// A deactivated seller can neither log in nor sell, and its existing tokens
/// stop working.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/sellers/{seller_id}",
    params(("seller_id" = i64, Path, description = "Seller id")),
    request_body = SellerUpdate,
    responses(
        (status = 200, description = "Updated seller", body = ApiResponse<Seller>),
        (status = 400, description = "Unknown field (such as credit) or wrong type"),
        (status = 404, description = "Unknown seller")
    ),
    security(("admin_secret" = [])),
    tag = "Admin"
)]
pub async fn update_seller(
    State(state): State<Arc<AppState>>,
    Path(seller_id): Path<SellerId>,
    payload: Result<Json<SellerUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse<Seller>>, ApiError> {
    let update = json_body(payload)?;
    let seller = state
        .sellers
        .store()
        .update_seller(seller_id, &update)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(
                error_codes::SELLER_NOT_FOUND,
                format!("Seller not found: {}", seller_id),
            )
        })?;
    tracing::info!(
        seller_id = seller_id,
        is_active = seller.is_active,
        is_staff = seller.is_staff,
        "Seller flags updated"
    );
    Ok(Json(ApiResponse::success(seller)))
}

/// Seller's ledger, newest first
///
/// GET /api/v1/admin/sellers/{seller_id}/transactions
#[utoipa::path(
    get,
    path = "/api/v1/admin/sellers/{seller_id}/transactions",
    params(("seller_id" = i64, Path, description = "Seller id"), ListQuery),
    responses(
        (status = 200, description = "Transactions", body = ApiResponse<Vec<Transaction>>),
        (status = 404, description = "Unknown seller")
    ),
    security(("admin_secret" = [])),
    tag = "Admin"
)]
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Path(seller_id): Path<SellerId>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Transaction>>>, ApiError> {
    let txs = state
        .ledger
        .store()
        .list_transactions(seller_id, Some(query.limit()))
        .await?;
    Ok(Json(ApiResponse::success(txs)))
}

/// Recompute the balance from the ledger
///
/// GET /api/v1/admin/sellers/{seller_id}/audit
#[utoipa::path(
    get,
    path = "/api/v1/admin/sellers/{seller_id}/audit",
    params(("seller_id" = i64, Path, description = "Seller id")),
    responses(
        (status = 200, description = "Audit report", body = ApiResponse<AuditReport>),
        (status = 404, description = "Unknown seller")
    ),
    security(("admin_secret" = [])),
    tag = "Admin"
)]
pub async fn audit_seller(
    State(state): State<Arc<AppState>>,
    Path(seller_id): Path<SellerId>,
) -> Result<Json<ApiResponse<AuditReport>>, ApiError> {
    let report = state.ledger.audit(seller_id).await?;
    Ok(Json(ApiResponse::success(report)))
}

/// Charge credit to a seller
///
/// POST /api/v1/admin/charges
#[utoipa::path(
    post,
    path = "/api/v1/admin/charges",
    request_body = ChargeRequest,
    responses(
        (status = 201, description = "Charge appended", body = ApiResponse<Transaction>),
        (status = 400, description = "Malformed or negative amount"),
        (status = 404, description = "Unknown seller")
    ),
    security(("admin_secret" = [])),
    tag = "Admin"
)]
pub async fn create_charge(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChargeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Transaction>>), ApiError> {
    let req = json_body(payload)?;
    let tx = state
        .ledger
        .charge(req.seller_id, req.amount, req.datetime)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(tx))))
}
