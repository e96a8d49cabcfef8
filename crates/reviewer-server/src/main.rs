mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use reviewer_api::AppStateInner;
use reviewer_core::ReviewService;
use reviewer_db::{Database, SqliteStore};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reviewer=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let db = open_database(&config).await?;
    let store = Arc::new(SqliteStore::new(Arc::new(db)));
    let service = ReviewService::new(store).with_update_attempts(config.update_attempts);
    let state = Arc::new(AppStateInner { service });

    let app = reviewer_api::router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(TimeoutLayer::new(config.request_timeout)),
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid listen address")?;
    info!("Reviewer service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Reviewer service stopped");
    Ok(())
}

/// The database may not be ready when the service starts, so opening is
/// retried with a fixed delay.
async fn open_database(config: &Config) -> anyhow::Result<Database> {
    let attempts = config.db_connect_attempts;
    let mut attempt = 1;
    loop {
        match Database::open(&config.db_path) {
            Ok(db) => return Ok(db),
            Err(e) if attempt < attempts => {
                warn!(
                    "Failed to open database (attempt {}/{}): {:#}",
                    attempt, attempts, e
                );
                tokio::time::sleep(config.db_connect_delay).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(e.context(format!(
                    "could not open database at {} after {} attempts",
                    config.db_path.display(),
                    attempts
                )));
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
