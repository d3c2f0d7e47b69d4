//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{
    AccountView, ChargeRequest, RegisterSellerRequest, SellResponse,
};
use crate::ledger::{AuditReport, Transaction, TransactionKind};
use crate::seller::{Seller, SellerUpdate};
use crate::spend::SpendRequest;
use crate::user_auth::service::{TokenRequest, TokenResponse};

/// Seller JWT and admin shared secret
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "admin_secret",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "X-Admin-Secret",
                    "Back-office shared secret",
                ))),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Credit Exchange API",
        version = "1.0.0",
        description = "Seller credit ledger: charges, sells and balance audits.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::user_auth::handlers::obtain_token,
        crate::gateway::handlers::seller::sell,
        crate::gateway::handlers::seller::get_account,
        crate::gateway::handlers::admin::create_seller,
        crate::gateway::handlers::admin::list_sellers,
        crate::gateway::handlers::admin::get_seller,
        crate::gateway::handlers::admin::update_seller,
        crate::gateway::handlers::admin::list_transactions,
        crate::gateway::handlers::admin::audit_seller,
        crate::gateway::handlers::admin::create_charge,
    ),
    components(
        schemas(
            HealthResponse,
            TokenRequest,
            TokenResponse,
            SpendRequest,
            SellResponse,
            AccountView,
            RegisterSellerRequest,
            SellerUpdate,
            ChargeRequest,
            Seller,
            Transaction,
            TransactionKind,
            AuditReport,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Token issuance"),
        (name = "Seller", description = "Sell credit and view the own account (JWT)"),
        (name = "Admin", description = "Back office (X-Admin-Secret)"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;
