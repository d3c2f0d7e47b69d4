//! Ledger Error Types
//!
//! Business rejections and infrastructure failures of the append path share
//! one enum so callers can match on the exact cause.

use thiserror::Error;

use crate::core_types::SellerId;

/// Ledger error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // === Business Rejections ===
    #[error("Amount must not be negative")]
    NegativeAmount,

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Receiver is required for a sell transaction")]
    MissingReceiver,

    #[error("Seller {0} is inactive")]
    SellerInactive(SellerId),

    // === Lookup ===
    #[error("Seller not found: {0}")]
    SellerNotFound(SellerId),

    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    // === Transient Failures (retryable) ===
    #[error("Timed out waiting for the account lock")]
    LockTimeout,

    #[error("Ledger store unavailable: {0}")]
    StoreUnavailable(String),

    // === Internal Errors ===
    #[error("Account {0} is not locked by this unit of work")]
    LockNotHeld(SellerId),

    #[error("Unit of work already finished")]
    UnitOfWorkFinished,

    #[error("Balance arithmetic overflow")]
    Overflow,

    /// Commit failed after reaching the store; the writes may or may not be durable
    #[error("Commit outcome unknown: {0}")]
    CommitUnknown(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::NegativeAmount => "NEGATIVE_AMOUNT",
            LedgerError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            LedgerError::MissingReceiver => "MISSING_RECEIVER",
            LedgerError::SellerInactive(_) => "SELLER_INACTIVE",
            LedgerError::SellerNotFound(_) => "SELLER_NOT_FOUND",
            LedgerError::DuplicateUsername(_) => "DUPLICATE_USERNAME",
            LedgerError::LockTimeout => "LOCK_TIMEOUT",
            LedgerError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            LedgerError::LockNotHeld(_) => "LOCK_NOT_HELD",
            LedgerError::UnitOfWorkFinished => "UNIT_OF_WORK_FINISHED",
            LedgerError::Overflow => "OVERFLOW",
            LedgerError::CommitUnknown(_) => "COMMIT_UNKNOWN",
            LedgerError::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            LedgerError::NegativeAmount
            | LedgerError::InsufficientBalance
            | LedgerError::MissingReceiver => 400,
            LedgerError::SellerInactive(_) => 403,
            LedgerError::SellerNotFound(_) => 404,
            LedgerError::DuplicateUsername(_) => 409,
            LedgerError::LockTimeout | LedgerError::StoreUnavailable(_) => 503,
            LedgerError::LockNotHeld(_)
            | LedgerError::UnitOfWorkFinished
            | LedgerError::Overflow
            | LedgerError::CommitUnknown(_)
            | LedgerError::Database(_) => 500,
        }
    }

    /// Safe to retry the whole append: nothing was applied.
    ///
    /// Never true for [`LedgerError::CommitUnknown`].
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::LockTimeout | LedgerError::StoreUnavailable(_)
        )
    }

    /// Business-rule rejection (as opposed to a failure)
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            LedgerError::NegativeAmount
                | LedgerError::InsufficientBalance
                | LedgerError::MissingReceiver
        )
    }
}

/// SQLSTATE lock_not_available (raised by `lock_timeout`)
const PG_LOCK_NOT_AVAILABLE: &str = "55P03";
/// SQLSTATE deadlock_detected
const PG_DEADLOCK_DETECTED: &str = "40P01";

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db)
                if matches!(
                    db.code().as_deref(),
                    Some(PG_LOCK_NOT_AVAILABLE) | Some(PG_DEADLOCK_DETECTED)
                ) =>
            {
                LedgerError::LockTimeout
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                LedgerError::StoreUnavailable(e.to_string())
            }
            _ => LedgerError::Database(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::NegativeAmount.code(), "NEGATIVE_AMOUNT");
        assert_eq!(
            LedgerError::InsufficientBalance.code(),
            "INSUFFICIENT_BALANCE"
        );
        assert_eq!(LedgerError::SellerNotFound(3).code(), "SELLER_NOT_FOUND");
    }

    #[test]
    fn test_http_status() {
        assert_eq!(LedgerError::NegativeAmount.http_status(), 400);
        assert_eq!(LedgerError::InsufficientBalance.http_status(), 400);
        assert_eq!(LedgerError::SellerNotFound(1).http_status(), 404);
        assert_eq!(LedgerError::LockTimeout.http_status(), 503);
        assert_eq!(LedgerError::Overflow.http_status(), 500);
        assert_eq!(LedgerError::SellerInactive(1).http_status(), 403);
        assert_eq!(LedgerError::DuplicateUsername("a".into()).http_status(), 409);
    }

    #[test]
    fn test_retry_classification() {
        assert!(LedgerError::LockTimeout.is_retryable());
        assert!(LedgerError::StoreUnavailable("down".into()).is_retryable());
        assert!(!LedgerError::InsufficientBalance.is_retryable());
        assert!(LedgerError::InsufficientBalance.is_rejection());
        assert!(!LedgerError::LockTimeout.is_rejection());
    }

    #[test]
    fn test_commit_unknown_is_final() {
        let err = LedgerError::CommitUnknown("connection reset".into());
        assert!(!err.is_retryable());
        assert!(!err.is_rejection());
        assert_eq!(err.http_status(), 500);
        assert_eq!(err.code(), "COMMIT_UNKNOWN");
    }

    #[test]
    fn test_pool_timeout_maps_to_unavailable() {
        let err: LedgerError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, LedgerError::StoreUnavailable(_)));
        let err: LedgerError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, LedgerError::Database(_)));
    }
}
