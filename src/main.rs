//! Localization management service.
//!
//! Main entry point. Loads configuration, connects to PostgreSQL, ensures
//! the schema exists and serves the HTTP API until shutdown.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use localize_api::{start_server, AppState, Config};
use localize_core::PgTranslationStore;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    init_tracing(&config.rust_log);

    info!("Starting localization service");

    let addr = config.parse_server_addr()?;
    info!(
        database_url = %config.database_url_masked(),
        server_addr = %addr,
        max_connections = config.database_max_connections,
        "Configuration loaded"
    );

    let db_pool = create_database_pool(&config).await?;
    info!("Database connection pool established");

    let store = PgTranslationStore::new(db_pool.clone());
    store.ensure_schema().await.context("Failed to prepare database schema")?;
    info!("Database schema ready");

    let state = AppState::new(Arc::new(store));
    start_server(state, addr, config.request_timeout_duration())
        .await
        .context("HTTP server failed")?;

    db_pool.close().await;
    info!("Database connections closed");

    info!("Localization service shutdown complete");
    Ok(())
}

/// Filter used when the configured one does not parse.
const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Initializes tracing with the configured filter.
///
/// `log_level` already reflects `RUST_LOG` when it is set. An invalid
/// filter falls back to [`DEFAULT_LOG_FILTER`] and is reported once
/// tracing is up.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let (filter, rejected) = log_filter(log_level);

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();

    if let Some(reason) = rejected {
        warn!(filter = log_level, error = %reason, "Invalid log filter, using default");
    }
}

/// Parses the log filter, returning the default and the parse error on failure.
fn log_filter(log_level: &str) -> (EnvFilter, Option<String>) {
    match EnvFilter::try_new(format!("{log_level},tower_http=debug")) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new(DEFAULT_LOG_FILTER), Some(e.to_string())),
    }
}

/// Creates the database connection pool with retry logic.
async fn create_database_pool(config: &Config) -> Result<sqlx::PgPool> {
    const MAX_RETRIES: u32 = 5;
    const RETRY_DELAY: Duration = Duration::from_secs(2);

    let mut retries = 0;

    loop {
        match PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connection_timeout))
            .idle_timeout(Duration::from_secs(config.database_idle_timeout))
            .max_lifetime(Duration::from_secs(config.database_max_lifetime))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => {
                sqlx::query("SELECT 1")
                    .fetch_one(&pool)
                    .await
                    .context("Failed to verify database connection")?;

                return Ok(pool);
            },
            Err(e) if retries < MAX_RETRIES => {
                retries += 1;
                info!(
                    attempt = retries,
                    max_retries = MAX_RETRIES,
                    error = %e,
                    "Database connection failed, retrying..."
                );
                tokio::time::sleep(RETRY_DELAY).await;
            },
            Err(e) => {
                return Err(e).context("Failed to create database connection pool after retries");
            },
        }
    }
}
