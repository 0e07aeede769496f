//! CLI subcommands.

pub mod admin;
pub mod migrate;
pub mod seed;

use tienda_storefront::config::{ConfigError, StorefrontConfig};
use sqlx::PgPool;

use tienda_storefront::db::create_pool;

/// Connect to the configured `PostgreSQL` database.
///
/// # Errors
///
/// Returns `ConnectError::Config` when no database URL is configured.
pub async fn connect() -> Result<PgPool, ConnectError> {
    let config = StorefrontConfig::from_env()?;
    let url = config.require_database_url()?;

    tracing::info!("Connecting to storefront database...");
    Ok(create_pool(url).await?)
}

/// Errors raised while opening the database.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}
