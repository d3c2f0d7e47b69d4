//! Ledger append service
//!
//! The only code path that inserts a transaction or changes a cached balance.
//! One append = one unit of work:
//!
//! ```text
//! begin → lock account → (SELL: enforce on locked snapshot) → insert row
//!       → update cached balance → commit
//! ```
//!
//! Any error before commit rolls the unit of work back, so a rejected or
//! failed append leaves neither a row nor a balance change behind. A failed
//! commit is reported as [`LedgerError::CommitUnknown`] and never retried.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::audit::AuditReport;
use super::enforcer::{SpendDecision, check_spend};
use super::error::LedgerError;
use super::store::{LedgerStore, UnitOfWork};
use super::types::{NewTransaction, Transaction, TransactionKind};
use crate::config::LedgerConfig;
use crate::core_types::{Credit, SellerId};
use crate::seller::{NewSeller, Seller};

/// Ledger append service
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
    max_retries: u32,
    retry_backoff: Duration,
}

impl LedgerService {
    pub fn new(store: Arc<dyn LedgerStore>, config: &LedgerConfig) -> Self {
        Self {
            store,
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff(),
        }
    }

    /// Underlying store (read side)
    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    /// Append one transaction and apply its signed effect atomically.
    ///
    /// `receiver` is required for SELL and ignored for CHARGE. `datetime`
    /// defaults to now.
    ///
    /// Retryable failures (lock timeout, store unavailable) are retried up to
    /// `max_retries` times; rejections are returned immediately.
    pub async fn append(
        &self,
        seller_id: SellerId,
        kind: TransactionKind,
        amount: Credit,
        receiver: Option<&str>,
        datetime: Option<DateTime<Utc>>,
    ) -> Result<Transaction, LedgerError> {
        let receiver = match kind {
            TransactionKind::Charge => None,
            TransactionKind::Sell => Some(receiver.ok_or(LedgerError::MissingReceiver)?),
        };

        self.with_retries(|| self.try_append(seller_id, kind, amount, receiver, datetime))
            .await
    }

    /// Create a seller account and grant its initial credit atomically.
    ///
    /// Either the account and its opening CHARGE both exist afterwards or
    /// neither does. Zero credit writes no transaction row.
    pub async fn open_account(
        &self,
        new: &NewSeller,
        initial_credit: Credit,
    ) -> Result<Seller, LedgerError> {
        if initial_credit < 0 {
            return Err(LedgerError::NegativeAmount);
        }
        self.with_retries(|| self.try_open_account(new, initial_credit))
            .await
    }

    /// Administrative credit grant
    pub async fn charge(
        &self,
        seller_id: SellerId,
        amount: Credit,
        datetime: Option<DateTime<Utc>>,
    ) -> Result<Transaction, LedgerError> {
        self.append(seller_id, TransactionKind::Charge, amount, None, datetime)
            .await
    }

    /// Spend credit toward `receiver`
    pub async fn sell(
        &self,
        seller_id: SellerId,
        amount: Credit,
        receiver: &str,
    ) -> Result<Transaction, LedgerError> {
        self.append(seller_id, TransactionKind::Sell, amount, Some(receiver), None)
            .await
    }

    /// Recompute the balance from the ledger and compare with the cache
    pub async fn audit(&self, seller_id: SellerId) -> Result<AuditReport, LedgerError> {
        let (account, totals) = self.store.audit_snapshot(seller_id).await?;
        let report = AuditReport::new(&account, &totals);
        if !report.consistent {
            error!(
                seller_id = seller_id,
                cached = report.cached_credit,
                ledger = report.ledger_balance,
                "Cached balance diverged from ledger"
            );
        }
        Ok(report)
    }

    /// Run `attempt_once` until it succeeds, fails for good, or the retry
    /// budget is spent
    async fn with_retries<T, F, Fut>(&self, mut attempt_once: F) -> Result<T, LedgerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LedgerError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match attempt_once().await {
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        attempt = attempt,
                        error = %e,
                        "Ledger unit of work failed transiently, retrying"
                    );
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                other => return other,
            }
        }
    }

    /// Single attempt: one unit of work, committed or rolled back.
    async fn try_append(
        &self,
        seller_id: SellerId,
        kind: TransactionKind,
        amount: Credit,
        receiver: Option<&str>,
        datetime: Option<DateTime<Utc>>,
    ) -> Result<Transaction, LedgerError> {
        let mut uow = self.store.begin().await?;

        let applied = apply(uow.as_mut(), seller_id, kind, amount, receiver, datetime).await;
        match applied {
            Ok(tx) => {
                if let Err(e) = commit(uow.as_mut()).await {
                    error!(
                        seller_id = seller_id,
                        kind = %kind,
                        amount = amount,
                        error = %e,
                        "Ledger commit failed, outcome unknown"
                    );
                    return Err(e);
                }
                info!(
                    seller_id = seller_id,
                    kind = %kind,
                    amount = amount,
                    tx_id = tx.id,
                    "Ledger append committed"
                );
                Ok(tx)
            }
            Err(e) => {
                rollback(uow.as_mut()).await;
                if e.is_rejection() {
                    debug!(
                        seller_id = seller_id,
                        kind = %kind,
                        amount = amount,
                        reason = e.code(),
                        "Ledger append rejected"
                    );
                }
                Err(e)
            }
        }
    }

    async fn try_open_account(
        &self,
        new: &NewSeller,
        initial_credit: Credit,
    ) -> Result<Seller, LedgerError> {
        let mut uow = self.store.begin().await?;

        let staged = stage_account(uow.as_mut(), new, initial_credit).await;
        match staged {
            Ok(seller) => {
                if let Err(e) = commit(uow.as_mut()).await {
                    error!(
                        seller_id = seller.seller_id,
                        username = %seller.username,
                        error = %e,
                        "Account opening commit failed, outcome unknown"
                    );
                    return Err(e);
                }
                info!(
                    seller_id = seller.seller_id,
                    username = %seller.username,
                    credit = seller.credit,
                    "Seller account opened"
                );
                Ok(seller)
            }
            Err(e) => {
                rollback(uow.as_mut()).await;
                Err(e)
            }
        }
    }
}

/// A commit that fails after reaching the store may still have landed, so
/// its error is reported as [`LedgerError::CommitUnknown`].
async fn commit(uow: &mut dyn UnitOfWork) -> Result<(), LedgerError> {
    uow.commit()
        .await
        .map_err(|e| LedgerError::CommitUnknown(e.to_string()))
}

async fn rollback(uow: &mut dyn UnitOfWork) {
    if let Err(rb) = uow.rollback().await {
        error!(error = %rb, "Ledger rollback failed");
    }
}

/// Insert the account and, for a positive grant, its opening CHARGE
async fn stage_account(
    uow: &mut dyn UnitOfWork,
    new: &NewSeller,
    initial_credit: Credit,
) -> Result<Seller, LedgerError> {
    let mut seller = uow.insert_seller(new).await?;
    if initial_credit > 0 {
        apply(
            uow,
            seller.seller_id,
            TransactionKind::Charge,
            initial_credit,
            None,
            None,
        )
        .await?;
        seller.credit = initial_credit;
    }
    Ok(seller)
}

/// Steps 2-6 of an append, inside an open unit of work
async fn apply(
    uow: &mut dyn UnitOfWork,
    seller_id: SellerId,
    kind: TransactionKind,
    amount: Credit,
    receiver: Option<&str>,
    datetime: Option<DateTime<Utc>>,
) -> Result<Transaction, LedgerError> {
    let locked = uow.lock_account_for_update(seller_id).await?;

    match kind {
        TransactionKind::Sell => {
            if !locked.account().is_active {
                return Err(LedgerError::SellerInactive(seller_id));
            }
            if let SpendDecision::Rejected(reason) = check_spend(&locked, amount) {
                return Err(reason.into());
            }
        }
        TransactionKind::Charge => {
            if amount < 0 {
                return Err(LedgerError::NegativeAmount);
            }
        }
    }

    let delta = kind.signed_delta(amount).ok_or(LedgerError::Overflow)?;
    let new_balance = locked
        .credit()
        .checked_add(delta)
        .ok_or(LedgerError::Overflow)?;

    let new_tx = NewTransaction {
        seller_id,
        kind,
        datetime: datetime.unwrap_or_else(Utc::now),
        receiver: receiver.map(str::to_string),
        amount,
    };
    let id = uow.insert_transaction(&new_tx).await?;
    uow.update_account_balance(seller_id, new_balance).await?;

    Ok(new_tx.into_transaction(id))
}
