//! Credit Exchange - seller credit ledger
//!
//! Sellers hold a credit balance that only moves through an append-only
//! ledger of CHARGE and SELL transactions. The cached balance always equals
//! the signed sum of that ledger and never goes negative, including under
//! concurrent spends from the same seller.
//!
//! # Modules
//!
//! - [`core_types`] - Id and amount aliases
//! - [`ledger`] - Transaction model, balance enforcement, append service
//! - [`store`] - PostgreSQL and in-memory ledger stores
//! - [`seller`] - Seller identity and registration
//! - [`spend`] - Spend request validation and outcome mapping
//! - [`user_auth`] - Password hashing, JWT issue and verification
//! - [`gateway`] - HTTP API

// Core types - must be first!
pub mod core_types;

pub mod config;
pub mod db;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod seller;
pub mod spend;
pub mod store;
pub mod user_auth;

// Convenient re-exports at crate root
pub use core_types::{Credit, SellerId, TransactionId};
pub use ledger::{LedgerError, LedgerService, Transaction, TransactionKind};
