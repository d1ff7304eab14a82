mod api;
mod config;
mod sentiment;
mod storage;

use crate::api::AppState;
use crate::config::AppConfig;
use crate::storage::ReviewStore;
use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting Sentiment Review API v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded");
    info!("   - Database: {}", config.storage.database_path.display());
    info!("   - Server: {}", config.bind_addr());

    // Initialize storage; a store that cannot be prepared aborts startup
    let store = ReviewStore::open(&config.storage.database_path)
        .context("Failed to open review database")?;
    store
        .initialize()
        .await
        .context("Failed to initialize reviews table")?;
    let review_count = store.count().await?;
    info!("Review storage ready ({} reviews)", review_count);

    let state = AppState {
        store: Arc::new(store),
    };
    let app = api::router(state);

    // Start server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("   GET  /health   - Health check");
    info!("   POST /reviews  - Add new review");
    info!("   GET  /reviews  - List reviews (?sentiment=positive|negative|neutral)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
