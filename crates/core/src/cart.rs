//! Session cart ledger.
//!
//! The ledger is the single source of truth for a session's unsubmitted
//! purchase intent. It is pure state: persistence and rendering live in the
//! storefront, which loads the ledger from the session, applies one
//! operation, and writes the full list back.
//!
//! Lines are keyed by [`ProductId`]. The product title and unit price are
//! snapshots taken when the line was created and are used for display only.

use serde::{Deserialize, Serialize};

use crate::purchase::PurchaseLine;
use crate::types::{Price, ProductId};

/// One product in the cart and how many units were requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Product this line refers to.
    pub product_id: ProductId,
    /// Product name at the time the line was created.
    pub product_title: String,
    /// Unit price at the time the line was created.
    pub unit_price: Price,
    /// Units requested, always at least 1.
    pub quantity: u32,
}

impl CartLineItem {
    /// `quantity × unit_price`.
    #[must_use]
    pub const fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Whether the cart has anything in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartState {
    /// No line items.
    Empty,
    /// At least one line item.
    HasItems,
}

/// Ordered list of cart line items.
///
/// Serializes as a plain JSON array of [`CartLineItem`]. Decoding normalizes
/// the list: zero-quantity lines are dropped and duplicate product ids are
/// merged into the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartLineItem>", into = "Vec<CartLineItem>")]
pub struct CartLedger {
    items: Vec<CartLineItem>,
}

impl CartLedger {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Line for `product_id`, if present.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `Empty` iff there are no lines.
    #[must_use]
    pub fn state(&self) -> CartState {
        if self.items.is_empty() {
            CartState::Empty
        } else {
            CartState::HasItems
        }
    }

    /// Add one unit of a product.
    ///
    /// If a line for `product_id` already exists its quantity is incremented
    /// and its snapshot is left as it was; otherwise a new line with quantity
    /// 1 is appended. Returns the line's quantity after the operation.
    pub fn add(&mut self, product_id: ProductId, title: impl Into<String>, unit_price: Price) -> u32 {
        if let Some(item) = self.items.iter_mut().find(|item| item.product_id == product_id) {
            item.quantity = item.quantity.saturating_add(1);
            return item.quantity;
        }

        self.items.push(CartLineItem {
            product_id,
            product_title: title.into(),
            unit_price,
            quantity: 1,
        });
        1
    }

    /// Remove the line for `product_id`.
    ///
    /// Returns `false` and leaves the cart untouched when no such line exists.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        match self.items.iter().position(|item| item.product_id == product_id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of every line's subtotal.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartLineItem::subtotal).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |count, item| count.saturating_add(item.quantity))
    }

    /// Purchase lines (`productId`, `quantity`) for checkout.
    #[must_use]
    pub fn purchase_lines(&self) -> Vec<PurchaseLine> {
        self.items
            .iter()
            .map(|item| PurchaseLine {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect()
    }
}

impl From<Vec<CartLineItem>> for CartLedger {
    fn from(items: Vec<CartLineItem>) -> Self {
        let mut ledger = Self::new();
        for item in items.into_iter().filter(|item| item.quantity > 0) {
            match ledger
                .items
                .iter_mut()
                .find(|existing| existing.product_id == item.product_id)
            {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => ledger.items.push(item),
            }
        }
        ledger
    }
}

impl From<CartLedger> for Vec<CartLineItem> {
    fn from(ledger: CartLedger) -> Self {
        ledger.items
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(amount: i64) -> Price {
        Price::new(amount).unwrap()
    }

    fn papel() -> (ProductId, &'static str, Price) {
        (ProductId::new(1), "Papel Higiénico", price(5200))
    }

    #[test]
    fn test_add_same_product_twice_merges() {
        let (id, title, unit) = papel();
        let mut cart = CartLedger::new();

        assert_eq!(cart.add(id, title, unit), 1);
        assert_eq!(cart.add(id, title, unit), 2);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(id).unwrap().quantity, 2);
    }

    #[test]
    fn test_add_keeps_first_snapshot() {
        let mut cart = CartLedger::new();
        cart.add(ProductId::new(1), "Papel Higiénico", price(5200));
        cart.add(ProductId::new(1), "Papel Higiénico XL", price(6000));

        let line = cart.get(ProductId::new(1)).unwrap();
        assert_eq!(line.product_title, "Papel Higiénico");
        assert_eq!(line.unit_price, price(5200));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let (id, title, unit) = papel();
        let mut cart = CartLedger::new();
        cart.add(id, title, unit);
        let before = cart.clone();

        assert!(!cart.remove(ProductId::new(99)));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_present_line() {
        let mut cart = CartLedger::new();
        cart.add(ProductId::new(1), "Papel Higiénico", price(5200));
        cart.add(ProductId::new(2), "Cloro Gel", price(1990));

        assert!(cart.remove(ProductId::new(1)));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].product_id, ProductId::new(2));
    }

    #[test]
    fn test_total_is_sum_of_subtotals() {
        let mut cart = CartLedger::new();
        cart.add(ProductId::new(1), "Papel Higiénico", price(5200));
        cart.add(ProductId::new(1), "Papel Higiénico", price(5200));
        cart.add(ProductId::new(2), "Toalla de papel Nobby Fit", price(680));

        let expected: i64 = cart.items().iter().map(|i| i.subtotal().amount()).sum();
        assert_eq!(cart.total().amount(), expected);
        assert_eq!(cart.total().amount(), 2 * 5200 + 680);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_subtotal_is_multiplicative_in_quantity() {
        let line = CartLineItem {
            product_id: ProductId::new(1),
            product_title: "Servilleta".into(),
            unit_price: price(1290),
            quantity: 4,
        };
        assert_eq!(line.subtotal().amount(), 4 * 1290);
    }

    #[test]
    fn test_state_tracks_emptiness() {
        let mut cart = CartLedger::new();
        assert_eq!(cart.state(), CartState::Empty);

        cart.add(ProductId::new(3), "Lavaloza", price(2490));
        assert_eq!(cart.state(), CartState::HasItems);

        cart.clear();
        assert_eq!(cart.state(), CartState::Empty);
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_serialization_round_trip_is_lossless() {
        let mut cart = CartLedger::new();
        cart.add(ProductId::new(1), "Papel Higiénico", price(5200));
        cart.add(ProductId::new(1), "Papel Higiénico", price(5200));
        cart.add(ProductId::new(7), "Shampoo Ballerina", price(1020));

        let json = serde_json::to_string(&cart).unwrap();
        let reloaded: CartLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded, cart);
    }

    #[test]
    fn test_wire_format_is_camel_case_array() {
        let mut cart = CartLedger::new();
        cart.add(ProductId::new(1), "Papel Higiénico", price(5200));

        let value = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{
                "productId": 1,
                "productTitle": "Papel Higiénico",
                "unitPrice": 5200,
                "quantity": 1
            }])
        );
    }

    #[test]
    fn test_decode_normalizes_duplicates_and_zero_quantities() {
        let json = r#"[
            {"productId": 1, "productTitle": "A", "unitPrice": 100, "quantity": 1},
            {"productId": 2, "productTitle": "B", "unitPrice": 200, "quantity": 0},
            {"productId": 1, "productTitle": "A", "unitPrice": 100, "quantity": 2}
        ]"#;
        let cart: CartLedger = serde_json::from_str(json).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 3);
    }

    #[test]
    fn test_purchase_lines_follow_cart_order() {
        let mut cart = CartLedger::new();
        cart.add(ProductId::new(4), "Detergente", price(3990));
        cart.add(ProductId::new(2), "Suavizante", price(2590));
        cart.add(ProductId::new(4), "Detergente", price(3990));

        let lines = cart.purchase_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product_id, ProductId::new(4));
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[1].quantity, 1);
    }
}
