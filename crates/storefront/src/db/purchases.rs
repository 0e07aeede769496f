//! Purchase ledger repository.
//!
//! Every recorded line keeps the product name and unit price at the time of
//! purchase, so later catalog edits or deletions do not rewrite history.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use tienda_core::{Price, ProductId, Purchase, PurchaseId, UserId};

use super::{Database, RepositoryError, map_constraint_error};
use crate::models::{Product, PurchaseReceipt, ReceiptLine};

#[derive(sqlx::FromRow)]
struct CatalogPriceRow {
    id: i32,
    name: String,
    price: i64,
}

#[derive(sqlx::FromRow)]
struct PurchaseRow {
    id: i32,
    user_id: i32,
    total: i64,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct LineRow {
    purchase_id: i32,
    product_id: i32,
    product_name: String,
    unit_price: i64,
    quantity: i32,
}

impl LineRow {
    fn into_line(self) -> Result<ReceiptLine, RepositoryError> {
        let unit_price = Price::new(self.unit_price)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid unit price: {e}")))?;
        let quantity = u32::try_from(self.quantity)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid quantity: {e}")))?;

        Ok(ReceiptLine {
            product_id: ProductId::new(self.product_id),
            product_name: self.product_name,
            unit_price,
            quantity,
            subtotal: unit_price.times(quantity),
        })
    }
}

/// Price every line of `purchase` against the catalog.
fn price_lines(
    purchase: &Purchase,
    catalog: &HashMap<ProductId, (String, Price)>,
) -> Result<Vec<ReceiptLine>, RepositoryError> {
    purchase
        .line_items
        .iter()
        .map(|line| {
            let (name, unit_price) = catalog.get(&line.product_id).ok_or_else(|| {
                RepositoryError::InvalidReference(format!("unknown product {}", line.product_id))
            })?;
            Ok(ReceiptLine {
                product_id: line.product_id,
                product_name: name.clone(),
                unit_price: *unit_price,
                quantity: line.quantity,
                subtotal: unit_price.times(line.quantity),
            })
        })
        .collect()
}

/// Repository for purchase operations.
pub struct PurchaseRepository<'a> {
    db: &'a Database,
}

impl<'a> PurchaseRepository<'a> {
    /// Create a new purchase repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Record a purchase.
    ///
    /// Unit prices are taken from the catalog at the time of the call and
    /// the total is computed from them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the user or any
    /// product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, purchase: &Purchase) -> Result<PurchaseReceipt, RepositoryError> {
        match self.db {
            Database::Postgres(pool) => {
                let mut tx = pool.begin().await?;

                let ids: Vec<i32> = purchase
                    .line_items
                    .iter()
                    .map(|line| line.product_id.as_i32())
                    .collect();
                let rows = sqlx::query_as::<_, CatalogPriceRow>(
                    "SELECT id, name, price FROM tienda.product WHERE id = ANY($1)",
                )
                .bind(&ids)
                .fetch_all(&mut *tx)
                .await?;

                let mut catalog = HashMap::with_capacity(rows.len());
                for row in rows {
                    let price = Price::new(row.price).map_err(|e| {
                        RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
                    })?;
                    catalog.insert(ProductId::new(row.id), (row.name, price));
                }
                let lines = price_lines(purchase, &catalog)?;
                let total: Price = lines.iter().map(|line| line.subtotal).sum();

                let header = sqlx::query_as::<_, PurchaseRow>(
                    r"
                    INSERT INTO tienda.purchase (user_id, total)
                    VALUES ($1, $2)
                    RETURNING id, user_id, total, created_at
                    ",
                )
                .bind(purchase.user_id.as_i32())
                .bind(total.amount())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_constraint_error(e, "purchase already exists"))?;

                for (position, line) in (0_i32..).zip(&lines) {
                    sqlx::query(
                        r"
                        INSERT INTO tienda.purchase_line
                            (purchase_id, position, product_id, product_name, unit_price, quantity)
                        VALUES ($1, $2, $3, $4, $5, $6)
                        ",
                    )
                    .bind(header.id)
                    .bind(position)
                    .bind(line.product_id.as_i32())
                    .bind(&line.product_name)
                    .bind(line.unit_price.amount())
                    .bind(i32::try_from(line.quantity).map_err(|_| {
                        RepositoryError::InvalidReference(format!(
                            "quantity {} out of range",
                            line.quantity
                        ))
                    })?)
                    .execute(&mut *tx)
                    .await?;
                }

                tx.commit().await?;

                Ok(PurchaseReceipt {
                    id: PurchaseId::new(header.id),
                    user_id: UserId::new(header.user_id),
                    line_items: lines,
                    total,
                    created_at: header.created_at,
                })
            }
            Database::Memory(mem) => {
                let mut tables = mem.write().await;
                if !tables.users.contains_key(&purchase.user_id) {
                    return Err(RepositoryError::InvalidReference(format!(
                        "unknown user {}",
                        purchase.user_id
                    )));
                }

                let catalog: HashMap<ProductId, (String, Price)> = tables
                    .products
                    .values()
                    .map(|p: &Product| (p.id, (p.name.clone(), p.price)))
                    .collect();
                let lines = price_lines(purchase, &catalog)?;
                let total = lines.iter().map(|line| line.subtotal).sum();

                let receipt = PurchaseReceipt {
                    id: tables.next_purchase_id(),
                    user_id: purchase.user_id,
                    line_items: lines,
                    total,
                    created_at: Utc::now(),
                };
                tables.purchases.insert(receipt.id, receipt.clone());
                Ok(receipt)
            }
        }
    }

    /// Purchases made by `user_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<PurchaseReceipt>, RepositoryError> {
        match self.db {
            Database::Postgres(pool) => {
                let headers = sqlx::query_as::<_, PurchaseRow>(
                    r"
                    SELECT id, user_id, total, created_at
                    FROM tienda.purchase
                    WHERE user_id = $1
                    ORDER BY id
                    ",
                )
                .bind(user_id.as_i32())
                .fetch_all(pool)
                .await?;

                let ids: Vec<i32> = headers.iter().map(|h| h.id).collect();
                let line_rows = sqlx::query_as::<_, LineRow>(
                    r"
                    SELECT purchase_id, product_id, product_name, unit_price, quantity
                    FROM tienda.purchase_line
                    WHERE purchase_id = ANY($1)
                    ORDER BY purchase_id, position
                    ",
                )
                .bind(&ids)
                .fetch_all(pool)
                .await?;

                let mut lines_by_purchase: HashMap<i32, Vec<ReceiptLine>> = HashMap::new();
                for row in line_rows {
                    let purchase_id = row.purchase_id;
                    lines_by_purchase
                        .entry(purchase_id)
                        .or_default()
                        .push(row.into_line()?);
                }

                headers
                    .into_iter()
                    .map(|header| {
                        let total = Price::new(header.total).map_err(|e| {
                            RepositoryError::DataCorruption(format!("invalid total: {e}"))
                        })?;
                        Ok(PurchaseReceipt {
                            id: PurchaseId::new(header.id),
                            user_id: UserId::new(header.user_id),
                            line_items: lines_by_purchase.remove(&header.id).unwrap_or_default(),
                            total,
                            created_at: header.created_at,
                        })
                    })
                    .collect()
            }
            Database::Memory(mem) => Ok(mem
                .read()
                .await
                .purchases
                .values()
                .filter(|receipt| receipt.user_id == user_id)
                .cloned()
                .collect()),
        }
    }
}
