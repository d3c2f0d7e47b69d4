//! HTTP handlers
//!
//! - [`health`]: liveness and store health
//! - [`seller`]: sell and account view for the authenticated seller
//! - [`admin`]: back office

pub mod admin;
pub mod health;
pub mod seller;

pub use health::{HealthResponse, health_check};
