//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;

/// Default maximum connections for the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
}

/// Create a PostgreSQL connection pool, connecting eagerly.
///
/// # Errors
///
/// Returns an error if the options are invalid or the first connection fails.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&DatabaseConfig::default()).await?;
/// ```
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let options = config.connect_options()?;
    tracing::info!(
        target = %config.display_target(),
        max_connections = config.max_connections,
        "connecting to database"
    );
    pool_options(config).connect_with(options).await
}

/// Create a pool that opens connections on first use.
///
/// Connection failures surface on the first query instead of at startup.
pub fn create_lazy_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let options = config.connect_options()?;
    Ok(pool_options(config).connect_lazy_with(options))
}
