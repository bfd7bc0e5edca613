use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use vkyc_recordings_api::auth::OidcProvider;
use vkyc_recordings_api::database::{DatabaseManager, PgRecordingRepository};
use vkyc_recordings_api::{app, config, AppState};

const DEFAULT_LOG_FILTER: &str = "vkyc_recordings_api=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, OIDC_*, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config().clone();
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting V-KYC recordings API in {:?} mode", config.environment);
    if !config.oidc.is_configured() {
        tracing::warn!("OIDC is not configured; logins will fail until OIDC_* is set");
    }

    let pool = DatabaseManager::connect_lazy(&config.database)?;
    let repository = Arc::new(PgRecordingRepository::new(pool));
    let identity = Arc::new(OidcProvider::new(config.oidc.clone()));

    let sweep_interval = Duration::from_secs(config.bulk.sweep_interval_secs);
    let port = config.server.port;
    let state = AppState::new(config, repository, identity);
    let _bulk_sweeper = state.bulk.spawn_sweeper(sweep_interval);
    let _session_sweeper = state.sessions.spawn_sweeper(sweep_interval);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
