use tracing_subscriber::EnvFilter;

use account_purge_api::app::{app, AppState};
use account_purge_api::config::config;
use account_purge_api::database::{DatabaseManager, PgHierarchyStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, GOOGLE_*, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    tracing::info!("Starting Account Purge API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is not set; sign-in and protected routes will fail");
    }

    // Connections open on first use, so the server boots without a reachable database
    let pool = match DatabaseManager::main_pool() {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(PgHierarchyStore::new(pool), config);
    let router = app(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Account Purge API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    DatabaseManager::close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
