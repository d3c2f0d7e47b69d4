//! Seller accounts
//!
//! Identity and registration. The `credit` column belongs to the ledger; this
//! module creates sellers at zero and reads them back.

pub mod error;
pub mod models;
pub mod repository;
pub mod service;
pub mod validation;

pub use error::SellerError;
pub use models::{NewSeller, Seller, SellerCredentials, SellerUpdate};
pub use repository::SellerStore;
pub use service::SellerService;
pub use validation::{Username, ValidationError};
