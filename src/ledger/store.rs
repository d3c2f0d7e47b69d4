//! Ledger store seam
//!
//! The append service is written against these traits. A store hands out one
//! [`UnitOfWork`] per append; everything done through it commits or rolls back
//! together.

use async_trait::async_trait;

use super::error::LedgerError;
use super::types::{Account, LedgerTotals, LockedAccount, NewTransaction, Transaction};
use crate::core_types::{Credit, SellerId, TransactionId};
use crate::seller::{NewSeller, Seller};

/// Durable storage of seller accounts and their transactions.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Store name for logging
    fn name(&self) -> &'static str;

    /// Unlocked read of the cached balance
    async fn get_account(&self, seller_id: SellerId) -> Result<Account, LedgerError>;

    /// Open an atomic unit of work
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, LedgerError>;

    /// Transactions of a seller, newest first
    async fn list_transactions(
        &self,
        seller_id: SellerId,
        limit: Option<i64>,
    ) -> Result<Vec<Transaction>, LedgerError>;

    /// Cached balance and ledger aggregates read consistently with each other.
    ///
    /// Waits for any in-flight append on the same seller to finish.
    async fn audit_snapshot(
        &self,
        seller_id: SellerId,
    ) -> Result<(Account, LedgerTotals), LedgerError>;

    /// Check store health
    async fn health_check(&self) -> Result<(), LedgerError>;
}

/// One atomic unit of work.
///
/// Dropping it without [`UnitOfWork::commit`] discards every staged write and
/// releases the locks it holds.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Take the exclusive lock on a seller account and read it.
    ///
    /// Blocks while another unit of work holds the same account; fails with
    /// [`LedgerError::LockTimeout`] when the wait exceeds the store's limit.
    async fn lock_account_for_update(
        &mut self,
        seller_id: SellerId,
    ) -> Result<LockedAccount, LedgerError>;

    /// Create a seller account with zero credit.
    ///
    /// The new account is locked by this unit of work and stays invisible to
    /// other readers until commit. A taken username fails with
    /// [`LedgerError::DuplicateUsername`].
    async fn insert_seller(&mut self, new: &NewSeller) -> Result<Seller, LedgerError>;

    /// Append a transaction row. Requires the owner's lock.
    async fn insert_transaction(
        &mut self,
        tx: &NewTransaction,
    ) -> Result<TransactionId, LedgerError>;

    /// Overwrite the cached balance. Requires the account's lock.
    async fn update_account_balance(
        &mut self,
        seller_id: SellerId,
        new_balance: Credit,
    ) -> Result<(), LedgerError>;

    /// Make every staged write visible at once and release the locks
    async fn commit(&mut self) -> Result<(), LedgerError>;

    /// Discard staged writes and release the locks
    async fn rollback(&mut self) -> Result<(), LedgerError>;
}
