pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use anyhow::Context;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

// OpenAPI / Swagger UI
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::GatewayConfig;
use crate::user_auth::middleware::{admin_secret_middleware, jwt_auth_middleware};
use state::AppState;

/// Build the complete router
pub fn build_router(state: Arc<AppState>) -> Router {
    // ==========================================================================
    // Auth Routes
    // ==========================================================================
    let auth_routes =
        Router::new().route("/token", post(crate::user_auth::handlers::obtain_token));

    // ==========================================================================
    // Seller Routes - Protected by JWT
    // ==========================================================================
    let seller_routes = Router::new()
        .route("/api/v1/sell", post(handlers::seller::sell))
        .route("/api/v1/account", get(handlers::seller::get_account))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    // ==========================================================================
    // Admin Routes - Protected by X-Admin-Secret
    // ==========================================================================
    let admin_routes = Router::new()
        .route(
            "/sellers",
            post(handlers::admin::create_seller).get(handlers::admin::list_sellers),
        )
        .route(
            "/sellers/{seller_id}",
            get(handlers::admin::get_seller).patch(handlers::admin::update_seller),
        )
        .route(
            "/sellers/{seller_id}/transactions",
            get(handlers::admin::list_transactions),
        )
        .route(
            "/sellers/{seller_id}/audit",
            get(handlers::admin::audit_seller),
        )
        .route("/charges", post(handlers::admin::create_charge))
        .layer(from_fn_with_state(state.clone(), admin_secret_middleware));

    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/admin", admin_routes)
        .merge(seller_routes)
        .with_state(state)
        // OpenAPI / Swagger UI (stateless, added after with_state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Start HTTP Gateway server; returns when the server stops
pub async fn run_server(config: &GatewayConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let store = state.store_name();
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {} (port in use?)", addr))?;

    tracing::info!(addr = %addr, store = store, "Gateway listening");
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
