//! Product catalog repository.

use tienda_core::{Category, Price, ProductId};

use super::{Database, RepositoryError, escape_like};
use crate::models::{NewProduct, Product};

const PRODUCT_COLUMNS: &str = "id, name, price, description, category, image_ref";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    price: i64,
    description: String,
    category: String,
    image_ref: String,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid price in database: {e}")))?;
        let category = row.category.parse::<Category>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid category in database: {e}"))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            price,
            description: row.description,
            category,
            image_ref: row.image_ref,
        })
    }
}

fn convert_rows(rows: Vec<ProductRow>) -> Result<Vec<Product>, RepositoryError> {
    rows.into_iter().map(Product::try_from).collect()
}

/// Repository for catalog operations.
pub struct ProductRepository<'a> {
    db: &'a Database,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// List the whole catalog in id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        match self.db {
            Database::Postgres(pool) => {
                let rows = sqlx::query_as::<_, ProductRow>(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM tienda.product ORDER BY id"
                ))
                .fetch_all(pool)
                .await?;
                convert_rows(rows)
            }
            Database::Memory(mem) => Ok(mem.read().await.products.values().cloned().collect()),
        }
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        match self.db {
            Database::Postgres(pool) => sqlx::query_as::<_, ProductRow>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM tienda.product WHERE id = $1"
            ))
            .bind(id.as_i32())
            .fetch_optional(pool)
            .await?
            .map(Product::try_from)
            .transpose(),
            Database::Memory(mem) => Ok(mem.read().await.products.get(&id).cloned()),
        }
    }

    /// Products in one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_by_category(&self, category: Category) -> Result<Vec<Product>, RepositoryError> {
        match self.db {
            Database::Postgres(pool) => {
                let rows = sqlx::query_as::<_, ProductRow>(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM tienda.product WHERE category = $1 ORDER BY id"
                ))
                .bind(category.slug())
                .fetch_all(pool)
                .await?;
                convert_rows(rows)
            }
            Database::Memory(mem) => Ok(mem
                .read()
                .await
                .products
                .values()
                .filter(|product| product.category == category)
                .cloned()
                .collect()),
        }
    }

    /// Products whose name contains `fragment`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn search_by_name(&self, fragment: &str) -> Result<Vec<Product>, RepositoryError> {
        let fragment = fragment.trim();
        match self.db {
            Database::Postgres(pool) => {
                let pattern = format!("%{}%", escape_like(fragment));
                let rows = sqlx::query_as::<_, ProductRow>(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM tienda.product WHERE name ILIKE $1 ORDER BY id"
                ))
                .bind(pattern)
                .fetch_all(pool)
                .await?;
                convert_rows(rows)
            }
            Database::Memory(mem) => {
                let needle = fragment.to_lowercase();
                Ok(mem
                    .read()
                    .await
                    .products
                    .values()
                    .filter(|product| product.name.to_lowercase().contains(&needle))
                    .cloned()
                    .collect())
            }
        }
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        match self.db {
            Database::Postgres(pool) => {
                let row = sqlx::query_as::<_, ProductRow>(&format!(
                    r"
                    INSERT INTO tienda.product (name, price, description, category, image_ref)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING {PRODUCT_COLUMNS}
                    "
                ))
                .bind(&new.name)
                .bind(new.price.amount())
                .bind(&new.description)
                .bind(new.category.slug())
                .bind(&new.image_ref)
                .fetch_one(pool)
                .await?;
                Product::try_from(row)
            }
            Database::Memory(mem) => {
                let mut tables = mem.write().await;
                let product = Product {
                    id: tables.next_product_id(),
                    name: new.name.clone(),
                    price: new.price,
                    description: new.description.clone(),
                    category: new.category,
                    image_ref: new.image_ref.clone(),
                };
                tables.products.insert(product.id, product.clone());
                Ok(product)
            }
        }
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: ProductId, changes: &NewProduct) -> Result<Product, RepositoryError> {
        match self.db {
            Database::Postgres(pool) => {
                let row = sqlx::query_as::<_, ProductRow>(&format!(
                    r"
                    UPDATE tienda.product
                    SET name = $2, price = $3, description = $4, category = $5,
                        image_ref = $6, updated_at = NOW()
                    WHERE id = $1
                    RETURNING {PRODUCT_COLUMNS}
                    "
                ))
                .bind(id.as_i32())
                .bind(&changes.name)
                .bind(changes.price.amount())
                .bind(&changes.description)
                .bind(changes.category.slug())
                .bind(&changes.image_ref)
                .fetch_optional(pool)
                .await?;
                Product::try_from(row.ok_or(RepositoryError::NotFound)?)
            }
            Database::Memory(mem) => {
                let mut tables = mem.write().await;
                let product = tables.products.get_mut(&id).ok_or(RepositoryError::NotFound)?;
                product.name.clone_from(&changes.name);
                product.price = changes.price;
                product.description.clone_from(&changes.description);
                product.category = changes.category;
                product.image_ref.clone_from(&changes.image_ref);
                Ok(product.clone())
            }
        }
    }

    /// Remove a product from the catalog.
    ///
    /// Recorded purchases keep their own name and price snapshot.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        match self.db {
            Database::Postgres(pool) => {
                let result = sqlx::query("DELETE FROM tienda.product WHERE id = $1")
                    .bind(id.as_i32())
                    .execute(pool)
                    .await?;
                Ok(result.rows_affected() > 0)
            }
            Database::Memory(mem) => Ok(mem.write().await.products.remove(&id).is_some()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(name: &str, price: i64, category: Category) -> NewProduct {
        NewProduct {
            name: name.into(),
            price: Price::new(price).unwrap(),
            description: format!("{name} description"),
            category,
            image_ref: String::new(),
        }
    }

    async fn seeded() -> Database {
        let db = Database::memory();
        let products = db.products();
        products
            .create(&product("Papel Higiénico Top One 20mts (Pack 12r)", 2499, Category::Papel))
            .await
            .unwrap();
        products
            .create(&product("Toalla de papel Nobby Fit", 680, Category::Papel))
            .await
            .unwrap();
        products
            .create(&product("Cloro Gel Briks Citrus 900ml", 1050, Category::Limpieza))
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let db = seeded().await;
        let papel = db.products().list_by_category(Category::Papel).await.unwrap();
        assert_eq!(papel.len(), 2);
        assert!(papel.iter().all(|p| p.category == Category::Papel));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring() {
        let db = seeded().await;
        let found = db.products().search_by_name("PAPEL").await.unwrap();
        let names: Vec<_> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            ["Papel Higiénico Top One 20mts (Pack 12r)", "Toalla de papel Nobby Fit"]
        );
        assert!(db.products().search_by_name("detergente").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = seeded().await;
        let products = db.products();
        let id = ProductId::new(3);

        let updated = products
            .update(id, &product("Cloro Gel Briks Lavanda 900ml", 1100, Category::Limpieza))
            .await
            .unwrap();
        assert_eq!(updated.id, id);
        assert_eq!(updated.price.amount(), 1100);

        assert!(products.delete(id).await.unwrap());
        assert!(!products.delete(id).await.unwrap());
        assert!(matches!(
            products.update(id, &product("x", 1, Category::Limpieza)).await,
            Err(RepositoryError::NotFound)
        ));
    }
}
