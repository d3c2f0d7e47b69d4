//! Request and response bodies of the HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::core_types::{Credit, SellerId};
use crate::ledger::Transaction;

// ============================================================================
// Seller surface
// ============================================================================

/// `POST /api/v1/sell` success body
#[derive(Debug, Serialize, ToSchema)]
pub struct SellResponse {
    #[schema(example = "Credit sold successfully.")]
    pub message: String,
    pub transaction: Transaction,
}

/// Seller's own balance and latest transactions
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountView {
    pub seller_id: SellerId,
    pub username: String,
    #[schema(example = 80)]
    pub credit: Credit,
    pub recent_transactions: Vec<Transaction>,
}

// ============================================================================
// Admin surface
// ============================================================================

/// `POST /api/v1/admin/sellers`
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterSellerRequest {
    #[schema(example = "test1")]
    #[validate(length(min = 1, max = 50, message = "Ensure this field has 1 to 50 characters."))]
    pub username: String,
    /// Omit to create a seller that cannot log in
    #[schema(example = "1234")]
    #[validate(length(min = 4, max = 128, message = "Ensure this field has 4 to 128 characters."))]
    pub password: Option<String>,
    /// Initial grant, applied as a CHARGE
    #[serde(default)]
    #[schema(example = 100)]
    pub credit: Credit,
    #[serde(default)]
    pub is_staff: bool,
}

/// `POST /api/v1/admin/charges`
///
/// A negative amount passes deserialization and is refused by the ledger.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChargeRequest {
    #[schema(example = 7)]
    pub seller_id: SellerId,
    #[schema(example = 100)]
    pub amount: Credit,
    /// Backfill timestamp; defaults to now
    pub datetime: Option<DateTime<Utc>>,
}

/// Paging for list endpoints
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Max rows, newest first (default 100, max 1000)
    pub limit: Option<i64>,
}

impl ListQuery {
    pub const DEFAULT_LIMIT: i64 = 100;
    pub const MAX_LIMIT: i64 = 1000;

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}
