//! Ledger store implementations
//!
//! - [`postgres::PgStore`]: production store, row locks via `FOR UPDATE`
//! - [`memory::InMemoryStore`]: process-local store for development and tests

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;
