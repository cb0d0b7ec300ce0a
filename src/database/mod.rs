pub mod repository;

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config;

/// Errors from the database layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

static POOL: OnceCell<PgPool> = OnceCell::const_new();

/// Shared connection pool, created lazily from DATABASE_URL.
pub async fn pool() -> Result<PgPool, DatabaseError> {
    let pool = POOL
        .get_or_try_init(|| async {
            let url = std::env::var("DATABASE_URL")
                .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;

            let cfg = &config::config().database;
            let pool = PgPoolOptions::new()
                .max_connections(cfg.max_connections)
                .acquire_timeout(Duration::from_secs(cfg.connect_timeout_secs))
                .connect(&url)
                .await?;

            info!("database pool ready (max_connections={})", cfg.max_connections);
            Ok::<_, DatabaseError>(pool)
        })
        .await?;
    Ok(pool.clone())
}

/// Cheap connectivity probe for the health endpoint.
pub async fn health_check() -> Result<(), DatabaseError> {
    let pool = pool().await?;
    sqlx::query("SELECT 1").execute(&pool).await?;
    Ok(())
}
