//! In-process storage backend.
//!
//! Used when no database URL is configured and by the integration tests.
//! Ids come from per-table sequences that only move forward, so a deleted
//! id is never handed out again.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tienda_core::{ProductId, PurchaseId, UserId};

use crate::models::{Product, PurchaseReceipt, User};

/// A directory user together with the stored password hash.
#[derive(Debug, Clone)]
pub(crate) struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

/// Table contents.
#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub users: BTreeMap<UserId, StoredUser>,
    pub products: BTreeMap<ProductId, Product>,
    pub purchases: BTreeMap<PurchaseId, PurchaseReceipt>,
    user_seq: i32,
    product_seq: i32,
    purchase_seq: i32,
}

impl Tables {
    pub fn next_user_id(&mut self) -> UserId {
        self.user_seq += 1;
        UserId::new(self.user_seq)
    }

    pub fn next_product_id(&mut self) -> ProductId {
        self.product_seq += 1;
        ProductId::new(self.product_seq)
    }

    pub fn next_purchase_id(&mut self) -> PurchaseId {
        self.purchase_seq += 1;
        PurchaseId::new(self.purchase_seq)
    }

    /// Whether `username` is taken by someone other than `except`.
    pub fn username_taken(&self, username: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|stored| stored.user.username == username && Some(stored.user.id) != except)
    }
}

/// Shared handle to the in-process tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryDatabase {
    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sequences_never_reuse_ids() {
        let db = MemoryDatabase::default();
        let mut tables = db.write().await;

        let first = tables.next_product_id();
        let second = tables.next_product_id();
        assert_eq!(first, ProductId::new(1));
        assert_eq!(second, ProductId::new(2));

        tables.products.remove(&second);
        assert_eq!(tables.next_product_id(), ProductId::new(3));
    }
}
