//! Recorded purchases.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tienda_core::{Price, ProductId, PurchaseId, UserId};

/// One recorded purchase line with the price charged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub product_id: ProductId,
    /// Product name when the purchase was made.
    pub product_name: String,
    /// Unit price when the purchase was made.
    pub unit_price: Price,
    pub quantity: u32,
    pub subtotal: Price,
}

/// A purchase as stored by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    pub id: PurchaseId,
    pub user_id: UserId,
    pub line_items: Vec<ReceiptLine>,
    pub total: Price,
    pub created_at: DateTime<Utc>,
}
