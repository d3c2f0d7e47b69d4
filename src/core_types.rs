//! Core types used throughout the system
//!
//! Type aliases shared by the ledger, the seller directory and the gateway.

/// Seller ID - primary key of a seller account, immutable after assignment.
pub type SellerId = i64;

/// Transaction ID - assigned monotonically by the ledger store.
///
/// Gaps are possible (a rolled-back append may consume an id), ordering is not
/// affected.
pub type TransactionId = i64;

/// Credit amount in whole units.
///
/// Signed so that the cached balance and the ledger sum share one type, but a
/// stored balance or transaction amount is never negative.
pub type Credit = i64;
