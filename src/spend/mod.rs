//! Spend use case: a seller sells credit to a receiver.

pub mod handler;
pub mod request;

pub use handler::{SpendHandler, SpendOutcome};
pub use request::{FieldErrors, SpendRequest, ValidSpend, collect_validation_errors};
