//! API Response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `ApiError`: Handler error, rendered as an `ApiResponse<()>`
//! - `error_codes`: Standard error code constants

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::ledger::{LedgerError, RejectReason};
use crate::seller::SellerError;
use crate::spend::FieldErrors;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
/// - errors: per-field messages for malformed input
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
            errors: None,
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
            errors: None,
        }
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INSUFFICIENT_BALANCE: i32 = 1002;
    pub const NEGATIVE_AMOUNT: i32 = 1003;

    // Auth errors (2xxx)
    pub const MISSING_AUTH: i32 = 2001;
    pub const AUTH_FAILED: i32 = 2002;
    pub const FORBIDDEN: i32 = 2003;

    // Resource errors (4xxx)
    pub const SELLER_NOT_FOUND: i32 = 4001;
    pub const DUPLICATE: i32 = 4009;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
}

// ============================================================================
// ApiError
// ============================================================================

/// Error returned by handlers and middleware
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
    pub errors: Option<FieldErrors>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
            errors: None,
        }
    }

    pub fn bad_request(code: i32, msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, msg)
    }

    /// 400 with per-field messages
    pub fn invalid_input(errors: FieldErrors) -> Self {
        Self {
            errors: Some(errors),
            ..Self::bad_request(error_codes::INVALID_PARAMETER, "Invalid input")
        }
    }

    pub fn unauthorized(code: i32, msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, msg)
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, error_codes::FORBIDDEN, msg)
    }

    pub fn not_found(code: i32, msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            msg,
        )
    }

    /// Business rejection of a spend or charge
    pub fn rejected(reason: RejectReason) -> Self {
        let code = match reason {
            RejectReason::NegativeAmount => error_codes::NEGATIVE_AMOUNT,
            RejectReason::InsufficientBalance => error_codes::INSUFFICIENT_BALANCE,
        };
        Self::bad_request(code, reason.code())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            code: self.code,
            msg: self.msg,
            data: None,
            errors: self.errors,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        if let Ok(reason) = RejectReason::try_from(&e) {
            return Self::rejected(reason);
        }
        let status =
            StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match e {
            LedgerError::MissingReceiver => {
                Self::bad_request(error_codes::INVALID_PARAMETER, e.to_string())
            }
            LedgerError::SellerNotFound(_) => {
                Self::not_found(error_codes::SELLER_NOT_FOUND, e.to_string())
            }
            LedgerError::SellerInactive(_) => Self::forbidden("Seller account is inactive"),
            LedgerError::DuplicateUsername(name) => SellerError::DuplicateUsername(name).into(),
            LedgerError::CommitUnknown(_) => {
                tracing::error!(error = %e, "Ledger commit outcome unknown");
                Self::internal("Outcome unknown; check the account before retrying")
            }
            LedgerError::LockTimeout | LedgerError::StoreUnavailable(_) => {
                tracing::warn!(error = %e, "Ledger temporarily unavailable");
                Self::new(status, error_codes::SERVICE_UNAVAILABLE, "Service unavailable, retry later")
            }
            _ => {
                tracing::error!(error = %e, code = e.code(), "Ledger failure");
                Self::internal("Internal server error")
            }
        }
    }
}

impl From<SellerError> for ApiError {
    fn from(e: SellerError) -> Self {
        match e {
            SellerError::Validation(v) => {
                Self::bad_request(error_codes::INVALID_PARAMETER, v.to_string())
            }
            SellerError::DuplicateUsername(name) => Self::new(
                StatusCode::CONFLICT,
                error_codes::DUPLICATE,
                format!("A seller with username '{}' already exists.", name),
            ),
            SellerError::NotFound(id) => Self::not_found(
                error_codes::SELLER_NOT_FOUND,
                format!("Seller not found: {}", id),
            ),
            SellerError::Ledger(e) => e.into(),
            SellerError::PasswordHash(_) | SellerError::Database(_) => {
                tracing::error!(error = %e, "Seller store failure");
                Self::internal("Internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_error_mapping() {
        let e = ApiError::from(LedgerError::InsufficientBalance);
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.code, error_codes::INSUFFICIENT_BALANCE);
        assert_eq!(e.msg, "INSUFFICIENT_BALANCE");

        let e = ApiError::from(LedgerError::NegativeAmount);
        assert_eq!(e.code, error_codes::NEGATIVE_AMOUNT);

        let e = ApiError::from(LedgerError::LockTimeout);
        assert_eq!(e.status, StatusCode::SERVICE_UNAVAILABLE);

        let e = ApiError::from(LedgerError::SellerNotFound(3));
        assert_eq!(e.status, StatusCode::NOT_FOUND);

        let e = ApiError::from(LedgerError::Overflow);
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.msg, "Internal server error");
    }

    #[test]
    fn test_seller_error_mapping() {
        let e = ApiError::from(SellerError::DuplicateUsername("test1".to_string()));
        assert_eq!(e.status, StatusCode::CONFLICT);
        let e = ApiError::from(SellerError::Ledger(LedgerError::NegativeAmount));
        assert_eq!(e.code, error_codes::NEGATIVE_AMOUNT);
    }

    #[test]
    fn test_unknown_commit_is_not_a_retry_hint() {
        let e = ApiError::from(LedgerError::CommitUnknown("connection reset".into()));
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.code, error_codes::INTERNAL_ERROR);

        let e = ApiError::from(LedgerError::SellerInactive(4));
        assert_eq!(e.status, StatusCode::FORBIDDEN);
        let e = ApiError::from(LedgerError::DuplicateUsername("test1".into()));
        assert_eq!(e.status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_error_body_shape() {
        let body = ApiResponse::<()>::error(error_codes::AUTH_FAILED, "nope");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"code": 2002, "msg": "nope"}));
    }
}
