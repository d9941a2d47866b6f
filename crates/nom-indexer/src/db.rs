//! Database pool construction and startup migrations.

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Build the shared connection pool and verify connectivity.
pub async fn new_pool(cfg: &DatabaseConfig) -> Result<PgPool> {
    info!(
        host = %cfg.host,
        port = cfg.port,
        database = %cfg.name,
        pool_size = cfg.pool_size,
        "connecting to database"
    );
    let pool = PgPoolOptions::new()
        .max_connections(cfg.pool_size)
        .min_connections(2)
        .max_lifetime(Duration::from_secs(3600))
        .idle_timeout(Duration::from_secs(1800))
        .connect(&cfg.connection_string())
        .await
        .context("failed to create connection pool")?;
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("failed to ping database")?;
    info!("connected to database");
    Ok(pool)
}

/// Apply pending migrations from the configured directory.
pub async fn run_migrations(pool: &PgPool, migrations_path: &str) -> Result<()> {
    let migrator = sqlx::migrate::Migrator::new(Path::new(migrations_path))
        .await
        .with_context(|| format!("failed to load migrations from {migrations_path}"))?;
    migrator
        .run(pool)
        .await
        .context("failed to run migrations")?;
    info!(path = migrations_path, "migrations complete");
    Ok(())
}
