//! Credit Exchange server
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────────┐    ┌──────────────┐
//! │  Config  │───▶│ Logging  │───▶│ Ledger store │───▶│   Gateway    │
//! │  (YAML)  │    │(tracing) │    │ (PG or mem)  │    │   (axum)     │
//! └──────────┘    └──────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! Usage: `credit_exchange [--env dev] [--port 8080]`

use anyhow::Context;
use std::sync::Arc;

use credit_exchange::config::AppConfig;
use credit_exchange::db::Database;
use credit_exchange::gateway::{self, state::AppState};
use credit_exchange::logging::init_logging;
use credit_exchange::store::PgStore;

fn get_arg(names: &[&str]) -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    args.iter()
        .position(|a| names.contains(&a.as_str()))
        .and_then(|i| args.get(i + 1).cloned())
}

fn get_env() -> String {
    get_arg(&["--env", "-e"]).unwrap_or_else(|| "dev".to_string())
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    get_arg(&["--port"]).and_then(|p| p.parse().ok())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }
    let _log_guard = init_logging(&app_config);

    tracing::info!(env = %env, "Starting Credit Exchange");

    let state = match app_config.postgres_url.as_deref() {
        Some(url) => {
            let db = Database::open(url, app_config.postgres_max_connections)
                .await
                .context("Failed to open PostgreSQL ledger database")?;
            let store = Arc::new(PgStore::new(
                Arc::new(db),
                app_config.ledger.lock_timeout(),
            ));
            AppState::new(store.clone(), store, &app_config)
        }
        None => {
            tracing::warn!("No postgres_url configured, using in-memory ledger store");
            AppState::in_memory(&app_config)
        }
    };

    gateway::run_server(&app_config.gateway, Arc::new(state)).await
}
