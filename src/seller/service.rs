//! Seller registration
//!
//! The initial grant goes through the ledger as a CHARGE, in the same unit
//! of work that creates the account, so a new balance is backed by a
//! transaction row and a failed grant leaves no seller behind.

use std::sync::Arc;
use tracing::info;

use super::error::SellerError;
use super::models::{NewSeller, Seller};
use super::repository::SellerStore;
use super::validation::Username;
use crate::core_types::Credit;
use crate::ledger::{LedgerError, LedgerService};
use crate::user_auth::service::hash_password;

pub struct SellerService {
    store: Arc<dyn SellerStore>,
    ledger: Arc<LedgerService>,
}

impl SellerService {
    pub fn new(store: Arc<dyn SellerStore>, ledger: Arc<LedgerService>) -> Self {
        Self { store, ledger }
    }

    pub fn store(&self) -> &Arc<dyn SellerStore> {
        &self.store
    }

    pub async fn register(
        &self,
        username: &str,
        password: Option<&str>,
        initial_credit: Credit,
        is_staff: bool,
    ) -> Result<Seller, SellerError> {
        let username = Username::new(username)?;
        if initial_credit < 0 {
            return Err(LedgerError::NegativeAmount.into());
        }

        let password_hash = password
            .map(hash_password)
            .transpose()
            .map_err(|e| SellerError::PasswordHash(e.to_string()))?;

        let new = NewSeller::new(username, password_hash).staff(is_staff);
        let seller = self.ledger.open_account(&new, initial_credit).await?;
        info!(
            seller_id = seller.seller_id,
            username = %seller.username,
            credit = seller.credit,
            is_staff = seller.is_staff,
            "Seller registered"
        );
        Ok(seller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::ledger::LedgerStore;
    use crate::store::memory::InMemoryStore;
    use std::time::Duration;

    fn service() -> (SellerService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new(Duration::from_millis(500)));
        let ledger = Arc::new(LedgerService::new(store.clone(), &LedgerConfig::default()));
        (SellerService::new(store.clone(), ledger), store)
    }

    #[tokio::test]
    async fn test_register_with_initial_credit() {
        let (service, store) = service();
        let seller = service.register("test1", Some("1234"), 80, false).await.unwrap();
        assert_eq!(seller.credit, 80);

        let txs = store.list_transactions(seller.seller_id, None).await.unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].amount, 80);

        let creds = store.find_credentials("test1").await.unwrap().unwrap();
        assert!(creds.password_hash.unwrap().starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_register_zero_credit_writes_no_row() {
        let (service, store) = service();
        let seller = service.register("test2", None, 0, true).await.unwrap();
        assert_eq!(seller.credit, 0);
        assert!(seller.is_staff);
        assert!(
            store
                .list_transactions(seller.seller_id, None)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let (service, _store) = service();
        service.register("test1", None, 0, false).await.unwrap();
        let err = service.register("test1", None, 0, false).await.unwrap_err();
        assert!(matches!(err, SellerError::DuplicateUsername(name) if name == "test1"));
    }

    #[tokio::test]
    async fn test_register_returns_stored_balance() {
        let (service, store) = service();
        let seller = service.register("test3", None, 45, false).await.unwrap();
        let stored = store.get_seller(seller.seller_id).await.unwrap().unwrap();
        assert_eq!(stored.credit, 45);
        assert_eq!(stored.username, seller.username);
        assert!(stored.is_active);
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let (service, _store) = service();
        assert!(matches!(
            service.register("has space", None, 0, false).await,
            Err(SellerError::Validation(_))
        ));
        assert!(matches!(
            service.register("ok", None, -1, false).await,
            Err(SellerError::Ledger(LedgerError::NegativeAmount))
        ));
    }
}
