//! HTTP server initialization and runtime setup.
//!
//! Handles storage selection, migrations and the Axum server lifecycle.

use crate::config::Config;
use crate::infrastructure::persistence::{PgDomainRepository, PgShortUrlRepository};
use crate::routes::app_router;
use crate::state::{AppState, StorageKind};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Connects to PostgreSQL and applies pending migrations.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn connect_database(config: &Config, database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    Ok(pool)
}

/// Builds the application state for the configured storage.
///
/// # Errors
///
/// Returns an error if the database is configured but unreachable.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let settings = config.short_url_settings();

    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("No database configured, short URLs are kept in memory");
        return Ok(AppState::in_memory(settings));
    };

    let pool = Arc::new(connect_database(config, database_url).await?);

    Ok(AppState::new(
        Arc::new(PgShortUrlRepository::new(pool.clone())),
        Arc::new(PgDomainRepository::new(pool)),
        settings,
        StorageKind::Postgres,
    ))
}

/// Runs the HTTP server with the given configuration.
///
/// Stops on Ctrl+C after in-flight requests complete.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migrations fail
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let state = build_state(&config).await?;

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
