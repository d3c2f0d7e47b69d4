use std::sync::Arc;

use crate::config::AppConfig;
use crate::ledger::{LedgerService, LedgerStore};
use crate::seller::{SellerService, SellerStore};
use crate::spend::SpendHandler;
use crate::store::InMemoryStore;
use crate::user_auth::UserAuthService;

/// Gateway application state (shared)
pub struct AppState {
    /// Append service (the only ledger writer)
    pub ledger: Arc<LedgerService>,
    /// Seller registration and lookup
    pub sellers: Arc<SellerService>,
    pub spend: SpendHandler,
    pub user_auth: Arc<UserAuthService>,
    /// Expected `X-Admin-Secret` value
    pub admin_secret: String,
}

impl AppState {
    /// Wire services over the given stores
    pub fn new(
        ledger_store: Arc<dyn LedgerStore>,
        seller_store: Arc<dyn SellerStore>,
        config: &AppConfig,
    ) -> Self {
        let ledger = Arc::new(LedgerService::new(ledger_store, &config.ledger));
        Self {
            sellers: Arc::new(SellerService::new(seller_store.clone(), ledger.clone())),
            spend: SpendHandler::new(ledger.clone()),
            user_auth: Arc::new(UserAuthService::new(seller_store, &config.auth)),
            admin_secret: config.auth.admin_secret.clone(),
            ledger,
        }
    }

    /// State backed by a fresh [`InMemoryStore`]
    pub fn in_memory(config: &AppConfig) -> Self {
        let store = Arc::new(InMemoryStore::new(config.ledger.lock_timeout()));
        Self::new(store.clone(), store, config)
    }

    /// Name of the ledger store in use
    pub fn store_name(&self) -> &'static str {
        self.ledger.store().name()
    }
}
