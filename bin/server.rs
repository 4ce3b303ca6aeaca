// Bank Registry - Web Server
// Composition root: config → store → registry → router

use anyhow::{Context, Result};
use bank_registry::http::{create_router, AppState};
use bank_registry::{AppConfig, BankRegistry, SqliteBankStore, StaticAuthenticator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,bank_registry=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = bank_registry::VERSION, "Starting bank registry server");

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    let banks = match &config.db_path {
        Some(path) => {
            let store = SqliteBankStore::open(path)?;
            tracing::info!(path = %path.display(), "Using SQLite bank store");
            BankRegistry::new(store)
        }
        None => {
            tracing::info!("Using in-memory bank store");
            BankRegistry::in_memory()
        }
    };

    let authenticator = StaticAuthenticator::new(config.account_id, config.user_id);
    let state = AppState::new(banks, authenticator, config.environment);
    let app = create_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server running on http://{}", addr);
    tracing::info!("  GET  /api/v1/health");
    tracing::info!("  POST /api/v1/internal/bank");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
