//! Database operations for the storefront.
//!
//! # Backends
//!
//! - `PostgreSQL` (schema `tienda`) when a database URL is configured
//! - An in-process store for development and tests otherwise
//!
//! Both backends sit behind the same repositories, so handlers and services
//! never branch on which one is active.
//!
//! ## Tables
//!
//! - `tienda.user` - Directory users (Argon2id password hashes, logged-in flag)
//! - `tienda.product` - Catalog
//! - `tienda.purchase` / `tienda.purchase_line` - Submitted purchases
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p tienda-cli -- migrate
//! ```

pub mod memory;
pub mod products;
pub mod purchases;
pub mod users;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use memory::MemoryDatabase;
pub use products::ProductRepository;
pub use purchases::PurchaseRepository;
pub use users::UserRepository;

/// Errors returned by repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The operation references an entity that does not exist.
    #[error("invalid reference: {0}")]
    InvalidReference(String),
}

/// Storage backend shared by every repository.
#[derive(Clone, Debug)]
pub enum Database {
    /// `PostgreSQL` connection pool.
    Postgres(PgPool),
    /// In-process tables.
    Memory(MemoryDatabase),
}

impl Database {
    /// Connect to `PostgreSQL` when a URL is given, otherwise start empty
    /// in-memory tables.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the connection cannot be established.
    pub async fn connect(database_url: Option<&SecretString>) -> Result<Self, sqlx::Error> {
        match database_url {
            Some(url) => Ok(Self::Postgres(create_pool(url).await?)),
            None => Ok(Self::memory()),
        }
    }

    /// Fresh, empty in-memory backend.
    #[must_use]
    pub fn memory() -> Self {
        Self::Memory(MemoryDatabase::default())
    }

    /// Short backend name for logs.
    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }

    /// Check that the backend can serve queries.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if `PostgreSQL` is unreachable.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        if let Self::Postgres(pool) = self {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }

    /// User directory.
    #[must_use]
    pub const fn users(&self) -> UserRepository<'_> {
        UserRepository::new(self)
    }

    /// Product catalog.
    #[must_use]
    pub const fn products(&self) -> ProductRepository<'_> {
        ProductRepository::new(self)
    }

    /// Purchase ledger.
    #[must_use]
    pub const fn purchases(&self) -> PurchaseRepository<'_> {
        PurchaseRepository::new(self)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map unique and foreign-key violations to repository errors.
fn map_constraint_error(err: sqlx::Error, conflict: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(conflict.to_owned());
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::InvalidReference(db_err.message().to_owned());
        }
    }
    RepositoryError::Database(err)
}

/// Escape `LIKE` wildcards so user text matches literally.
fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("papel"), "papel");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[tokio::test]
    async fn test_memory_backend_pings() {
        let db = Database::connect(None).await.unwrap();
        assert_eq!(db.backend_name(), "memory");
        assert!(db.ping().await.is_ok());
    }
}
