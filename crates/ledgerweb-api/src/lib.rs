//! HTTP JSON API server
//!
//! Routes are organized into modules:
//! - routes::data: Whole-document read and merge
//! - routes::transactions: Recording transactions
//! - routes::accounts: Account creation, removal, activation, budgets

pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use ledgerweb_config::Config;
use ledgerweb_core::Ledger;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Write-locked for every mutation, so one load/mutate/save runs at a time
    pub ledger: Arc<RwLock<Ledger>>,
    pub config: Config,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::accounts::{
        api_add_account, api_delete_account, api_toggle_account, api_update_budget,
    };
    use routes::data::{api_data, api_update};
    use routes::transactions::api_add_transaction;

    let cors = state.config.server.cors;

    let router = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/data", get(api_data))
        .route("/api/update", post(api_update))
        .route("/api/add_transaction", post(api_add_transaction))
        .route("/api/toggle_account", post(api_toggle_account))
        .route("/api/add_account", post(api_add_account))
        .route("/api/delete_account", post(api_delete_account))
        .route("/api/update_budget", post(api_update_budget))
        .with_state(state);

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Start the HTTP server
///
/// Binds to the configured address and serves until Ctrl-C.
///
/// # Arguments
///
/// * `config` - The application configuration
/// * `ledger` - The shared ledger
pub async fn start_server(config: Config, ledger: Arc<RwLock<Ledger>>) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let location = ledger.read().await.location();
    let state = AppState { ledger, config };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting Ledgerweb server on http://{}", addr);
    log::info!("Serving ledger document from {}", location);
    log::debug!("Routes: GET /api/data, POST /api/{{update, add_transaction, toggle_account, add_account, delete_account, update_budget}}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
        // Without a signal handler, never resolve: keep serving.
        std::future::pending::<()>().await;
    }
}
