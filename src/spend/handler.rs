//! Sell requests from the HTTP surface into the ledger
//!
//! Shape errors and business rejections come back as a [`SpendOutcome`].
//! Anything else, an inactive seller included, is returned as an error.

use std::sync::Arc;

use super::request::{FieldErrors, SpendRequest};
use crate::core_types::SellerId;
use crate::ledger::{LedgerError, LedgerService, RejectReason, Transaction};

/// Result of a spend attempt that reached a decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpendOutcome {
    Created(Transaction),
    /// Business rule refused the spend
    Rejected(RejectReason),
    /// Request shape was wrong; the ledger was not touched
    InvalidInput(FieldErrors),
}

/// Seller-facing "spend `amount` toward `receiver`"
pub struct SpendHandler {
    ledger: Arc<LedgerService>,
}

impl SpendHandler {
    pub fn new(ledger: Arc<LedgerService>) -> Self {
        Self { ledger }
    }

    /// Validate, then append a SELL.
    ///
    /// `Err` is left for failures that are not the caller's fault: lock
    /// timeouts after retries, unknown seller, store errors.
    pub async fn handle_spend(
        &self,
        seller_id: SellerId,
        request: SpendRequest,
    ) -> Result<SpendOutcome, LedgerError> {
        let spend = match request.validate() {
            Ok(spend) => spend,
            Err(errors) => return Ok(SpendOutcome::InvalidInput(errors)),
        };

        match self
            .ledger
            .sell(seller_id, spend.amount, &spend.receiver)
            .await
        {
            Ok(tx) => Ok(SpendOutcome::Created(tx)),
            Err(e) => match RejectReason::try_from(&e) {
                Ok(reason) => Ok(SpendOutcome::Rejected(reason)),
                Err(()) => Err(e),
            },
        }
    }
}
