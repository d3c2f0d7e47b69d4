//! Seller authentication
//!
//! Argon2 password hashes, HS256 JWTs carrying the seller id, and the axum
//! middleware that guards seller and admin routes.

pub mod handlers;
pub mod middleware;
pub mod service;

pub use service::{AuthError, Claims, UserAuthService};
