//! Purchase request payloads.
//!
//! A [`Purchase`] is built transiently at checkout from the cart ledger and
//! the logged-in user. It is the body of `POST /compras`.

use serde::{Deserialize, Serialize};

use crate::cart::CartLedger;
use crate::types::{ProductId, UserId};

/// Largest quantity a single line may carry; quantities are stored as `INTEGER`.
pub const MAX_LINE_QUANTITY: u32 = 0x7FFF_FFFF;

/// One product and quantity in a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLine {
    /// Purchased product.
    #[serde(alias = "productoId")]
    pub product_id: ProductId,
    /// Units purchased.
    #[serde(alias = "cantidad")]
    pub quantity: u32,
}

/// A purchase submitted on behalf of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    /// Buyer.
    #[serde(alias = "usuarioId")]
    pub user_id: UserId,
    /// Purchased products.
    #[serde(alias = "detalles")]
    pub line_items: Vec<PurchaseLine>,
}

impl Purchase {
    /// Build a purchase from a cart.
    ///
    /// Returns `None` when the cart is empty.
    #[must_use]
    pub fn from_cart(user_id: UserId, cart: &CartLedger) -> Option<Self> {
        if cart.is_empty() {
            return None;
        }

        Some(Self {
            user_id,
            line_items: cart.purchase_lines(),
        })
    }

    /// Whether every line asks for at least one unit.
    #[must_use]
    pub fn has_positive_quantities(&self) -> bool {
        self.line_items.iter().all(|line| line.quantity > 0)
    }

    /// Whether every line stays within [`MAX_LINE_QUANTITY`].
    #[must_use]
    pub fn quantities_within_limit(&self) -> bool {
        self.line_items
            .iter()
            .all(|line| line.quantity <= MAX_LINE_QUANTITY)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Price;

    #[test]
    fn test_from_empty_cart_is_none() {
        assert!(Purchase::from_cart(UserId::new(1), &CartLedger::new()).is_none());
    }

    #[test]
    fn test_from_cart_maps_lines_by_product_id() {
        let mut cart = CartLedger::new();
        let unit = Price::new(5200).unwrap();
        cart.add(ProductId::new(9), "Papel Higiénico", unit);
        cart.add(ProductId::new(9), "Papel Higiénico", unit);

        let purchase = Purchase::from_cart(UserId::new(1), &cart).unwrap();
        assert_eq!(
            serde_json::to_value(&purchase).unwrap(),
            serde_json::json!({
                "userId": 1,
                "lineItems": [{"productId": 9, "quantity": 2}]
            })
        );
    }

    #[test]
    fn test_accepts_legacy_field_names() {
        let json = r#"{"usuarioId": 3, "detalles": [{"productoId": 5, "cantidad": 1}]}"#;
        let purchase: Purchase = serde_json::from_str(json).unwrap();
        assert_eq!(purchase.user_id, UserId::new(3));
        assert_eq!(purchase.line_items[0].product_id, ProductId::new(5));
        assert!(purchase.has_positive_quantities());
    }

    #[test]
    fn test_quantity_limit_matches_storage_column() {
        assert_eq!(i64::from(MAX_LINE_QUANTITY), i64::from(i32::MAX));

        let mut purchase = Purchase {
            user_id: UserId::new(1),
            line_items: vec![PurchaseLine {
                product_id: ProductId::new(1),
                quantity: MAX_LINE_QUANTITY,
            }],
        };
        assert!(purchase.quantities_within_limit());

        purchase.line_items[0].quantity = 4_000_000_000;
        assert!(!purchase.quantities_within_limit());
    }
}
