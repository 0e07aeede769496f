//! Catalog seeding command.
//!
//! # Usage
//!
//! ```bash
//! tienda-cli seed catalog crates/cli/seed/catalog.yaml
//! ```
//!
//! # File Format
//!
//! ```yaml
//! products:
//!   - name: "Cloro Gel Briks Citrus 900ml"
//!     price: 1050
//!     category: limpieza
//!     description: "..."
//!     image: "assets/img/Limpieza/Cloro Gel Briks Citrus 900ml.jpg"
//! ```
//!
//! Products whose name is already in the catalog are skipped, so the command
//! can be run more than once.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use tienda_core::{Category, Price};
use tienda_storefront::db::{Database, RepositoryError};
use tienda_storefront::models::NewProduct;

use super::ConnectError;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid catalog file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid product {name:?}: {reason}")]
    InvalidProduct { name: String, reason: String },

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Top-level catalog file.
#[derive(Debug, Deserialize)]
pub struct CatalogSeed {
    pub products: Vec<ProductSeed>,
}

/// One catalog entry.
#[derive(Debug, Deserialize)]
pub struct ProductSeed {
    pub name: String,
    pub price: i64,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

/// What a seeding run did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
}

/// Load `path` into the configured database.
///
/// # Errors
///
/// Returns `SeedError` if the file is unreadable or invalid, or the database
/// rejects a product.
pub async fn catalog(path: &Path) -> Result<(), SeedError> {
    let text = std::fs::read_to_string(path).map_err(|source| SeedError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let seed: CatalogSeed = serde_yaml::from_str(&text)?;

    let db = Database::Postgres(super::connect().await?);
    let report = seed_catalog(&db, &seed).await?;

    tracing::info!(
        created = report.created,
        skipped = report.skipped,
        "Catalog seeded"
    );
    Ok(())
}

/// Insert every product of `seed` whose name is not yet in the catalog.
///
/// Every entry is checked before anything is written.
///
/// # Errors
///
/// Returns `SeedError::InvalidProduct` for a negative price or unknown
/// category, and `SeedError::Repository` if an insert fails.
pub async fn seed_catalog(db: &Database, seed: &CatalogSeed) -> Result<SeedReport, SeedError> {
    let products = seed
        .products
        .iter()
        .map(ProductSeed::to_new_product)
        .collect::<Result<Vec<_>, _>>()?;

    let mut existing: HashSet<String> = db
        .products()
        .list()
        .await?
        .into_iter()
        .map(|p| p.name)
        .collect();

    let mut report = SeedReport::default();
    for product in products {
        if !existing.insert(product.name.clone()) {
            tracing::debug!(name = %product.name, "Product already present, skipping");
            report.skipped += 1;
            continue;
        }
        db.products().create(&product).await?;
        report.created += 1;
    }
    Ok(report)
}

impl ProductSeed {
    fn to_new_product(&self) -> Result<NewProduct, SeedError> {
        let invalid = |reason: String| SeedError::InvalidProduct {
            name: self.name.clone(),
            reason,
        };
        let price = Price::new(self.price).map_err(|e| invalid(e.to_string()))?;
        let category = self
            .category
            .parse::<Category>()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(NewProduct {
            name: self.name.trim().to_owned(),
            price,
            description: self.description.trim().to_owned(),
            category,
            image_ref: self.image.trim().to_owned(),
        })
    }
}
