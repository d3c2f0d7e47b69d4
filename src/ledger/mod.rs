//! Credit ledger
//!
//! Append-only transaction history per seller with a cached balance that is
//! kept equal to the signed sum of that history.
//!
//! # Invariants
//!
//! 1. `credit == Σ CHARGE - Σ SELL` for every seller
//! 2. `credit >= 0`
//! 3. Transactions are never updated or deleted
//! 4. [`LedgerService`] is the only writer, through
//!    [`LedgerService::append`] and [`LedgerService::open_account`]; a SELL is
//!    checked against the balance read under the account's exclusive lock,
//!    inside the same unit of work that writes the row and the new balance

pub mod audit;
pub mod enforcer;
pub mod error;
pub mod service;
pub mod store;
pub mod types;

pub use audit::AuditReport;
pub use enforcer::{RejectReason, SpendDecision, check_spend};
pub use error::LedgerError;
pub use service::LedgerService;
pub use store::{LedgerStore, UnitOfWork};
pub use types::{Account, LedgerTotals, LockedAccount, NewTransaction, Transaction, TransactionKind};
