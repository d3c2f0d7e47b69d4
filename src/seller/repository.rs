//! Seller persistence seam

use async_trait::async_trait;

use super::error::SellerError;
use super::models::{NewSeller, Seller, SellerCredentials, SellerUpdate};
use crate::core_types::SellerId;

/// Storage of seller identities.
///
/// Balances are not written here: a new seller starts at zero and only the
/// ledger moves the credit afterwards.
#[async_trait]
pub trait SellerStore: Send + Sync {
    /// Insert a seller with zero credit in a unit of work of its own
    async fn create_seller(&self, new: &NewSeller) -> Result<Seller, SellerError>;

    async fn get_seller(&self, seller_id: SellerId) -> Result<Option<Seller>, SellerError>;

    /// Apply the set flags; `None` when the seller does not exist
    async fn update_seller(
        &self,
        seller_id: SellerId,
        update: &SellerUpdate,
    ) -> Result<Option<Seller>, SellerError>;

    /// Login lookup by exact username
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<SellerCredentials>, SellerError>;

    /// Sellers ordered by id
    async fn list_sellers(&self, limit: i64) -> Result<Vec<Seller>, SellerError>;
}
