use thiserror::Error;

use super::validation::ValidationError;
use crate::core_types::SellerId;
use crate::ledger::LedgerError;

#[derive(Error, Debug)]
pub enum SellerError {
    #[error("Invalid seller: {0}")]
    Validation(#[from] ValidationError),

    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    #[error("Seller not found: {0}")]
    NotFound(SellerId),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Ledger error: {0}")]
    Ledger(LedgerError),

    #[error("Database error: {0}")]
    Database(String),
}

/// SQLSTATE unique_violation
const PG_UNIQUE_VIOLATION: &str = "23505";

/// A failed INSERT that clashed with an existing username
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some(PG_UNIQUE_VIOLATION))
}

impl From<LedgerError> for SellerError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::DuplicateUsername(name) => SellerError::DuplicateUsername(name),
            other => SellerError::Ledger(other),
        }
    }
}

impl From<sqlx::Error> for SellerError {
    fn from(e: sqlx::Error) -> Self {
        SellerError::Database(e.to_string())
    }
}
