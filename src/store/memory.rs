//! In-memory ledger store
//!
//! Used for development runs without PostgreSQL and in tests. Each seller has
//! its own async mutex standing in for the row lock; a unit of work keeps the
//! owned guard until commit or rollback and stages its writes locally, so
//! nothing it does is visible before commit. A staged seller reserves its
//! username at once; the reservation is dropped again if the unit never
//! commits.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::core_types::{Credit, SellerId, TransactionId};
use crate::ledger::{
    Account, LedgerError, LedgerStore, LedgerTotals, LockedAccount, NewTransaction, Transaction,
    UnitOfWork,
};
use crate::seller::{NewSeller, Seller, SellerCredentials, SellerError, SellerStore, SellerUpdate};

struct SellerRecord {
    seller: Seller,
    password_hash: Option<String>,
}

impl SellerRecord {
    fn account(&self) -> Account {
        Account {
            seller_id: self.seller.seller_id,
            username: self.seller.username.clone(),
            credit: self.seller.credit,
            is_active: self.seller.is_active,
            updated_at: self.seller.updated_at,
        }
    }
}

#[derive(Default)]
struct Tables {
    sellers: DashMap<SellerId, SellerRecord>,
    usernames: DashMap<String, SellerId>,
    row_locks: DashMap<SellerId, Arc<Mutex<()>>>,
    ledger: DashMap<SellerId, Vec<Transaction>>,
    next_seller_id: AtomicI64,
    next_tx_id: AtomicI64,
}

impl Tables {
    fn row_lock(&self, seller_id: SellerId) -> Result<Arc<Mutex<()>>, LedgerError> {
        self.row_locks
            .get(&seller_id)
            .map(|lock| lock.value().clone())
            .ok_or(LedgerError::SellerNotFound(seller_id))
    }

    fn account(&self, seller_id: SellerId) -> Result<Account, LedgerError> {
        self.sellers
            .get(&seller_id)
            .map(|record| record.account())
            .ok_or(LedgerError::SellerNotFound(seller_id))
    }

    /// Claim `username` for a seller id not yet published
    fn reserve_username(&self, username: &str) -> Result<SellerId, LedgerError> {
        match self.usernames.entry(username.to_string()) {
            Entry::Occupied(_) => Err(LedgerError::DuplicateUsername(username.to_string())),
            Entry::Vacant(slot) => {
                let seller_id = self.next_seller_id.fetch_add(1, Ordering::SeqCst);
                slot.insert(seller_id);
                Ok(seller_id)
            }
        }
    }
}

/// Process-local store
pub struct InMemoryStore {
    tables: Arc<Tables>,
    lock_timeout: Duration,
}

impl InMemoryStore {
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            tables: Arc::new(Tables {
                next_seller_id: AtomicI64::new(1),
                next_tx_id: AtomicI64::new(1),
                ..Default::default()
            }),
            lock_timeout,
        }
    }
}

impl InMemoryStore {
    fn unit_of_work(&self) -> MemoryUnitOfWork {
        MemoryUnitOfWork {
            tables: self.tables.clone(),
            lock_timeout: self.lock_timeout,
            guards: HashMap::new(),
            staged_sellers: HashMap::new(),
            staged_txs: Vec::new(),
            staged_balances: HashMap::new(),
            finished: false,
        }
    }
}

async fn acquire(
    lock: Arc<Mutex<()>>,
    timeout: Duration,
) -> Result<OwnedMutexGuard<()>, LedgerError> {
    tokio::time::timeout(timeout, lock.lock_owned())
        .await
        .map_err(|_| LedgerError::LockTimeout)
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_account(&self, seller_id: SellerId) -> Result<Account, LedgerError> {
        self.tables.account(seller_id)
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, LedgerError> {
        Ok(Box::new(self.unit_of_work()))
    }

    async fn list_transactions(
        &self,
        seller_id: SellerId,
        limit: Option<i64>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let rows = self
            .tables
            .ledger
            .get(&seller_id)
            .ok_or(LedgerError::SellerNotFound(seller_id))?;
        let take = limit.map_or(usize::MAX, |l| usize::try_from(l.max(0)).unwrap_or(0));
        Ok(rows.iter().rev().take(take).cloned().collect())
    }

    async fn audit_snapshot(
        &self,
        seller_id: SellerId,
    ) -> Result<(Account, LedgerTotals), LedgerError> {
        let lock = self.tables.row_lock(seller_id)?;
        let _guard = acquire(lock, self.lock_timeout).await?;

        let account = self.tables.account(seller_id)?;
        let totals = self
            .tables
            .ledger
            .get(&seller_id)
            .map(|rows| LedgerTotals::from_transactions(rows.iter()))
            .unwrap_or_default();
        Ok((account, totals))
    }

    async fn health_check(&self) -> Result<(), LedgerError> {
        Ok(())
    }
}

/// Seller created by an uncommitted unit of work
struct StagedSeller {
    record: SellerRecord,
    row_lock: Arc<Mutex<()>>,
}

struct MemoryUnitOfWork {
    tables: Arc<Tables>,
    lock_timeout: Duration,
    guards: HashMap<SellerId, OwnedMutexGuard<()>>,
    staged_sellers: HashMap<SellerId, StagedSeller>,
    staged_txs: Vec<Transaction>,
    staged_balances: HashMap<SellerId, Credit>,
    finished: bool,
}

impl MemoryUnitOfWork {
    fn ensure_open(&self) -> Result<(), LedgerError> {
        if self.finished {
            return Err(LedgerError::UnitOfWorkFinished);
        }
        Ok(())
    }

    fn ensure_locked(&self, seller_id: SellerId) -> Result<(), LedgerError> {
        self.ensure_open()?;
        if !self.guards.contains_key(&seller_id) {
            return Err(LedgerError::LockNotHeld(seller_id));
        }
        Ok(())
    }

    /// Account as this unit of work sees it, staged writes included
    fn current_account(&self, seller_id: SellerId) -> Result<Account, LedgerError> {
        let mut account = match self.staged_sellers.get(&seller_id) {
            Some(staged) => staged.record.account(),
            None => self.tables.account(seller_id)?,
        };
        if let Some(staged) = self.staged_balances.get(&seller_id) {
            account.credit = *staged;
        }
        Ok(account)
    }

    fn release(&mut self) {
        for (seller_id, staged) in self.staged_sellers.drain() {
            self.tables
                .usernames
                .remove_if(&staged.record.seller.username, |_, id| *id == seller_id);
        }
        self.staged_txs.clear();
        self.staged_balances.clear();
        self.guards.clear();
        self.finished = true;
    }
}

impl Drop for MemoryUnitOfWork {
    fn drop(&mut self) {
        if !self.finished {
            self.release();
        }
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn lock_account_for_update(
        &mut self,
        seller_id: SellerId,
    ) -> Result<LockedAccount, LedgerError> {
        self.ensure_open()?;
        if !self.guards.contains_key(&seller_id) {
            let lock = self.tables.row_lock(seller_id)?;
            let guard = acquire(lock, self.lock_timeout).await?;
            self.guards.insert(seller_id, guard);
        }

        Ok(LockedAccount::new(self.current_account(seller_id)?))
    }

    async fn insert_seller(&mut self, new: &NewSeller) -> Result<Seller, LedgerError> {
        self.ensure_open()?;
        let seller_id = self.tables.reserve_username(new.username.as_str())?;

        let now = Utc::now();
        let seller = Seller {
            seller_id,
            username: new.username.as_str().to_string(),
            credit: 0,
            is_active: true,
            is_staff: new.is_staff,
            created_at: now,
            updated_at: now,
        };
        let row_lock = Arc::new(Mutex::new(()));
        let guard = row_lock
            .clone()
            .try_lock_owned()
            .map_err(|_| LedgerError::LockTimeout)?;
        self.guards.insert(seller_id, guard);
        self.staged_sellers.insert(
            seller_id,
            StagedSeller {
                record: SellerRecord {
                    seller: seller.clone(),
                    password_hash: new.password_hash.clone(),
                },
                row_lock,
            },
        );
        Ok(seller)
    }

    async fn insert_transaction(
        &mut self,
        tx: &NewTransaction,
    ) -> Result<TransactionId, LedgerError> {
        self.ensure_locked(tx.seller_id)?;
        if tx.amount < 0 {
            return Err(LedgerError::Database(
                "amount violates non-negative constraint".to_string(),
            ));
        }
        let id = self.tables.next_tx_id.fetch_add(1, Ordering::SeqCst);
        self.staged_txs.push(tx.clone().into_transaction(id));
        Ok(id)
    }

    async fn update_account_balance(
        &mut self,
        seller_id: SellerId,
        new_balance: Credit,
    ) -> Result<(), LedgerError> {
        self.ensure_locked(seller_id)?;
        if new_balance < 0 {
            return Err(LedgerError::Database(
                "credit violates non-negative constraint".to_string(),
            ));
        }
        self.staged_balances.insert(seller_id, new_balance);
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), LedgerError> {
        self.ensure_open()?;
        let now = Utc::now();

        // Locks are still held here, so readers that take them see all or nothing
        for (seller_id, staged) in self.staged_sellers.drain() {
            self.tables.row_locks.insert(seller_id, staged.row_lock);
            self.tables.ledger.insert(seller_id, Vec::new());
            self.tables.sellers.insert(seller_id, staged.record);
        }
        for tx in self.staged_txs.drain(..) {
            self.tables.ledger.entry(tx.seller_id).or_default().push(tx);
        }
        for (seller_id, balance) in self.staged_balances.drain() {
            if let Some(mut record) = self.tables.sellers.get_mut(&seller_id) {
                record.seller.credit = balance;
                record.seller.updated_at = now;
            }
        }

        self.release();
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), LedgerError> {
        self.ensure_open()?;
        self.release();
        Ok(())
    }
}

#[async_trait]
impl SellerStore for InMemoryStore {
    async fn create_seller(&self, new: &NewSeller) -> Result<Seller, SellerError> {
        let mut uow = self.unit_of_work();
        let seller = uow.insert_seller(new).await?;
        uow.commit().await?;
        Ok(seller)
    }

    async fn update_seller(
        &self,
        seller_id: SellerId,
        update: &SellerUpdate,
    ) -> Result<Option<Seller>, SellerError> {
        let Some(mut record) = self.tables.sellers.get_mut(&seller_id) else {
            return Ok(None);
        };
        if update.is_empty() {
            return Ok(Some(record.seller.clone()));
        }
        if let Some(is_active) = update.is_active {
            record.seller.is_active = is_active;
        }
        if let Some(is_staff) = update.is_staff {
            record.seller.is_staff = is_staff;
        }
        record.seller.updated_at = Utc::now();
        Ok(Some(record.seller.clone()))
    }

    async fn get_seller(&self, seller_id: SellerId) -> Result<Option<Seller>, SellerError> {
        Ok(self
            .tables
            .sellers
            .get(&seller_id)
            .map(|record| record.seller.clone()))
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<SellerCredentials>, SellerError> {
        let Some(seller_id) = self.tables.usernames.get(username).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self
            .tables
            .sellers
            .get(&seller_id)
            .map(|record| SellerCredentials {
                seller_id,
                username: record.seller.username.clone(),
                password_hash: record.password_hash.clone(),
                is_active: record.seller.is_active,
            }))
    }

    async fn list_sellers(&self, limit: i64) -> Result<Vec<Seller>, SellerError> {
        let mut sellers: Vec<Seller> = self
            .tables
            .sellers
            .iter()
            .map(|record| record.seller.clone())
            .collect();
        sellers.sort_by_key(|s| s.seller_id);
        sellers.truncate(usize::try_from(limit.max(0)).unwrap_or(0));
        Ok(sellers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TransactionKind;
    use crate::seller::Username;

    async fn store_with_seller() -> (InMemoryStore, SellerId) {
        let store = InMemoryStore::new(Duration::from_millis(50));
        let seller = store
            .create_seller(&NewSeller::new(Username::new("test1").unwrap(), None))
            .await
            .unwrap();
        (store, seller.seller_id)
    }

    fn charge(seller_id: SellerId, amount: Credit) -> NewTransaction {
        NewTransaction {
            seller_id,
            kind: TransactionKind::Charge,
            datetime: Utc::now(),
            receiver: None,
            amount,
        }
    }

    #[tokio::test]
    async fn test_writes_invisible_until_commit() {
        let (store, id) = store_with_seller().await;
        let mut uow = store.begin().await.unwrap();
        uow.lock_account_for_update(id).await.unwrap();
        uow.insert_transaction(&charge(id, 30)).await.unwrap();
        uow.update_account_balance(id, 30).await.unwrap();

        assert_eq!(store.get_account(id).await.unwrap().credit, 0);
        assert!(store.list_transactions(id, None).await.unwrap().is_empty());

        uow.commit().await.unwrap();
        assert_eq!(store.get_account(id).await.unwrap().credit, 30);
        assert_eq!(store.list_transactions(id, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rollback_and_drop_discard() {
        let (store, id) = store_with_seller().await;

        let mut uow = store.begin().await.unwrap();
        uow.lock_account_for_update(id).await.unwrap();
        uow.insert_transaction(&charge(id, 30)).await.unwrap();
        uow.update_account_balance(id, 30).await.unwrap();
        uow.rollback().await.unwrap();

        {
            let mut uow = store.begin().await.unwrap();
            uow.lock_account_for_update(id).await.unwrap();
            uow.update_account_balance(id, 99).await.unwrap();
        }

        assert_eq!(store.get_account(id).await.unwrap().credit, 0);
        assert!(store.list_transactions(id, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_locker_times_out() {
        let (store, id) = store_with_seller().await;
        let mut first = store.begin().await.unwrap();
        first.lock_account_for_update(id).await.unwrap();

        let mut second = store.begin().await.unwrap();
        let err = second.lock_account_for_update(id).await.unwrap_err();
        assert_eq!(err, LedgerError::LockTimeout);

        first.commit().await.unwrap();
        assert!(second.lock_account_for_update(id).await.is_ok());
    }

    #[tokio::test]
    async fn test_relock_in_same_unit_sees_staged_balance() {
        let (store, id) = store_with_seller().await;
        let mut uow = store.begin().await.unwrap();
        uow.lock_account_for_update(id).await.unwrap();
        uow.update_account_balance(id, 12).await.unwrap();
        let again = uow.lock_account_for_update(id).await.unwrap();
        assert_eq!(again.credit(), 12);
    }

    #[tokio::test]
    async fn test_writes_require_lock() {
        let (store, id) = store_with_seller().await;
        let mut uow = store.begin().await.unwrap();
        assert_eq!(
            uow.insert_transaction(&charge(id, 1)).await.unwrap_err(),
            LedgerError::LockNotHeld(id)
        );
        assert_eq!(
            uow.update_account_balance(id, 1).await.unwrap_err(),
            LedgerError::LockNotHeld(id)
        );
    }

    #[tokio::test]
    async fn test_negative_balance_refused() {
        let (store, id) = store_with_seller().await;
        let mut uow = store.begin().await.unwrap();
        uow.lock_account_for_update(id).await.unwrap();
        assert!(matches!(
            uow.update_account_balance(id, -1).await,
            Err(LedgerError::Database(_))
        ));
    }

    #[tokio::test]
    async fn test_finished_unit_refuses_work() {
        let (store, id) = store_with_seller().await;
        let mut uow = store.begin().await.unwrap();
        uow.commit().await.unwrap();
        assert_eq!(
            uow.lock_account_for_update(id).await.unwrap_err(),
            LedgerError::UnitOfWorkFinished
        );
        assert_eq!(uow.commit().await.unwrap_err(), LedgerError::UnitOfWorkFinished);
    }

    #[tokio::test]
    async fn test_audit_waits_for_lock_holder() {
        let (store, id) = store_with_seller().await;
        let mut uow = store.begin().await.unwrap();
        uow.lock_account_for_update(id).await.unwrap();
        assert_eq!(
            store.audit_snapshot(id).await.unwrap_err(),
            LedgerError::LockTimeout
        );
        uow.rollback().await.unwrap();
        let (account, totals) = store.audit_snapshot(id).await.unwrap();
        assert_eq!(i128::from(account.credit), totals.net());
    }

    #[tokio::test]
    async fn test_list_transactions_newest_first_with_limit() {
        let (store, id) = store_with_seller().await;
        for amount in [1, 2, 3] {
            let mut uow = store.begin().await.unwrap();
            let locked = uow.lock_account_for_update(id).await.unwrap();
            uow.insert_transaction(&charge(id, amount)).await.unwrap();
            uow.update_account_balance(id, locked.credit() + amount)
                .await
                .unwrap();
            uow.commit().await.unwrap();
        }
        let rows = store.list_transactions(id, Some(2)).await.unwrap();
        assert_eq!(rows.iter().map(|t| t.amount).collect::<Vec<_>>(), vec![3, 2]);
    }

    #[tokio::test]
    async fn test_seller_lookup() {
        let (store, id) = store_with_seller().await;
        let creds = store.find_credentials("test1").await.unwrap().unwrap();
        assert_eq!(creds.seller_id, id);
        assert!(store.find_credentials("nobody").await.unwrap().is_none());
        assert_eq!(store.list_sellers(10).await.unwrap().len(), 1);
        assert!(matches!(
            store.get_account(id + 1).await,
            Err(LedgerError::SellerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_staged_seller_hidden_until_commit() {
        let store = InMemoryStore::new(Duration::from_millis(50));
        let new = NewSeller::new(Username::new("test1").unwrap(), None);

        let mut uow = store.begin().await.unwrap();
        let seller = uow.insert_seller(&new).await.unwrap();
        let locked = uow.lock_account_for_update(seller.seller_id).await.unwrap();
        assert_eq!(locked.credit(), 0);
        uow.insert_transaction(&charge(seller.seller_id, 25)).await.unwrap();
        uow.update_account_balance(seller.seller_id, 25).await.unwrap();

        assert!(store.get_seller(seller.seller_id).await.unwrap().is_none());
        assert!(store.find_credentials("test1").await.unwrap().is_none());
        assert!(matches!(
            store.create_seller(&new).await,
            Err(SellerError::DuplicateUsername(_))
        ));

        uow.commit().await.unwrap();
        assert_eq!(store.get_account(seller.seller_id).await.unwrap().credit, 25);
        assert_eq!(store.list_transactions(seller.seller_id, None).await.unwrap().len(), 1);
        assert!(store.find_credentials("test1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_abandoned_seller_frees_username() {
        let store = InMemoryStore::new(Duration::from_millis(50));
        let new = NewSeller::new(Username::new("test1").unwrap(), None);

        let mut uow = store.begin().await.unwrap();
        let staged = uow.insert_seller(&new).await.unwrap();
        uow.rollback().await.unwrap();

        {
            let mut dropped = store.begin().await.unwrap();
            dropped.insert_seller(&new).await.unwrap();
        }

        let seller = store.create_seller(&new).await.unwrap();
        assert_ne!(seller.seller_id, staged.seller_id);
        assert_eq!(store.list_sellers(10).await.unwrap().len(), 1);
        assert!(matches!(
            store.get_account(staged.seller_id).await,
            Err(LedgerError::SellerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_seller_flags_only() {
        let (store, id) = store_with_seller().await;
        let updated = store
            .update_seller(
                id,
                &SellerUpdate {
                    is_active: Some(false),
                    is_staff: Some(true),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(!updated.is_active);
        assert!(updated.is_staff);
        assert_eq!(updated.credit, 0);
        assert!(!store.find_credentials("test1").await.unwrap().unwrap().is_active);
        assert!(!store.get_account(id).await.unwrap().is_active);

        assert!(
            store
                .update_seller(id + 1, &SellerUpdate::default())
                .await
                .unwrap()
                .is_none()
        );
    }
}
