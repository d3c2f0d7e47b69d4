//! Data models for seller accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;

use super::validation::Username;
use crate::core_types::{Credit, SellerId};

/// Seller account as exposed to the admin surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct Seller {
    #[schema(example = 7)]
    pub seller_id: SellerId,
    #[schema(example = "test1")]
    pub username: String,
    /// Cached balance, read-only everywhere but the ledger
    #[schema(example = 80)]
    pub credit: Credit,
    pub is_active: bool,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Seller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.username, self.credit)
    }
}

/// What login needs, nothing more
#[derive(Debug, Clone, FromRow)]
pub struct SellerCredentials {
    pub seller_id: SellerId,
    pub username: String,
    pub password_hash: Option<String>,
    pub is_active: bool,
}

/// Registration input. Credit always starts at zero.
#[derive(Debug, Clone)]
pub struct NewSeller {
    pub username: Username,
    pub password_hash: Option<String>,
    pub is_staff: bool,
}

impl NewSeller {
    pub fn new(username: Username, password_hash: Option<String>) -> Self {
        Self {
            username,
            password_hash,
            is_staff: false,
        }
    }

    pub fn staff(mut self, is_staff: bool) -> Self {
        self.is_staff = is_staff;
        self
    }
}

/// Back-office flag change. `credit` is not a field: balances move only
/// through the ledger, and unknown fields are refused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SellerUpdate {
    /// `false` blocks login and selling
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
}

impl SellerUpdate {
    pub fn is_empty(&self) -> bool {
        self.is_active.is_none() && self.is_staff.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seller_display() {
        let now = Utc::now();
        let seller = Seller {
            seller_id: 1,
            username: "test1".to_string(),
            credit: 130,
            is_active: true,
            is_staff: false,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(seller.to_string(), "test1: 130");
    }

    #[test]
    fn test_new_seller_defaults() {
        let new = NewSeller::new(Username::new("test2").unwrap(), None);
        assert!(!new.is_staff);
        assert!(new.staff(true).is_staff);
    }

    #[test]
    fn test_update_refuses_credit() {
        let update: SellerUpdate = serde_json::from_str(r#"{"is_active": false}"#).unwrap();
        assert_eq!(update.is_active, Some(false));
        assert!(!update.is_empty());
        assert!(SellerUpdate::default().is_empty());

        let err = serde_json::from_str::<SellerUpdate>(r#"{"credit": 1000}"#).unwrap_err();
        assert!(err.to_string().contains("unknown field"), "{err}");
    }
}
