//! Gateway types module
//!
//! ## Submodules
//! - [`response`]: Response envelope, error codes and [`ApiError`]
//! - [`dto`]: Request and response bodies

pub mod dto;
pub mod response;

// Re-export commonly used types at module root
pub use dto::{
    AccountView, ChargeRequest, ListQuery, RegisterSellerRequest, SellResponse,
};
pub use response::{ApiError, ApiResponse, error_codes};
