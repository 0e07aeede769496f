//! Session-backed cart.
//!
//! Each operation loads the ledger from the session, applies one change and
//! writes the whole line list back under [`session_keys::CART`].

use tower_sessions::Session;

use tienda_core::{CartLedger, ProductId};

use crate::models::{Product, session_keys};

/// Cart stored in the request's session.
pub struct CartSession<'a> {
    session: &'a Session,
}

impl<'a> CartSession<'a> {
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Load the cart. A missing or unreadable entry is an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn load(&self) -> Result<CartLedger, tower_sessions::session::Error> {
        let Some(value) = self.session.get_value(session_keys::CART).await? else {
            return Ok(CartLedger::new());
        };

        Ok(serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Discarding unreadable cart from session");
            CartLedger::new()
        }))
    }

    /// Persist the full line list.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn save(&self, cart: &CartLedger) -> Result<(), tower_sessions::session::Error> {
        self.session.insert(session_keys::CART, cart).await
    }

    /// Add one unit of `product`. Returns the updated cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn add(&self, product: &Product) -> Result<CartLedger, tower_sessions::session::Error> {
        let mut cart = self.load().await?;
        let quantity = cart.add(product.id, product.name.clone(), product.price);
        self.save(&cart).await?;

        tracing::debug!(product_id = %product.id, quantity, "Added to cart");
        Ok(cart)
    }

    /// Remove the line for `product_id`, if any. Returns the updated cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn remove(&self, product_id: ProductId) -> Result<CartLedger, tower_sessions::session::Error> {
        let mut cart = self.load().await?;
        let removed = cart.remove(product_id);
        self.save(&cart).await?;

        tracing::debug!(product_id = %product_id, removed, "Removed from cart");
        Ok(cart)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn clear(&self) -> Result<(), tower_sessions::session::Error> {
        self.session
            .remove_value(session_keys::CART)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tienda_core::{Category, Price};
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn papel() -> Product {
        Product {
            id: ProductId::new(7),
            name: "Papel Higiénico".into(),
            price: Price::new(5200).unwrap(),
            description: "Doble hoja".into(),
            category: Category::Papel,
            image_ref: String::new(),
        }
    }

    #[tokio::test]
    async fn test_empty_session_is_empty_cart() {
        let session = session();
        let cart = CartSession::new(&session).load().await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_add_twice_persists_one_line() {
        let session = session();
        let carts = CartSession::new(&session);

        carts.add(&papel()).await.unwrap();
        carts.add(&papel()).await.unwrap();

        let cart = carts.load().await.unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.total().amount(), 10_400);
    }

    #[tokio::test]
    async fn test_reload_reproduces_line_items() {
        let session = session();
        let carts = CartSession::new(&session);
        let saved = carts.add(&papel()).await.unwrap();

        assert_eq!(carts.load().await.unwrap(), saved);
    }

    #[tokio::test]
    async fn test_remove_absent_is_noop() {
        let session = session();
        let carts = CartSession::new(&session);
        let before = carts.add(&papel()).await.unwrap();

        let after = carts.remove(ProductId::new(99)).await.unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_unreadable_entry_is_discarded() {
        let session = session();
        session
            .insert(session_keys::CART, "not a cart")
            .await
            .unwrap();

        let cart = CartSession::new(&session).load().await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let session = session();
        let carts = CartSession::new(&session);
        carts.add(&papel()).await.unwrap();

        carts.clear().await.unwrap();
        assert!(carts.load().await.unwrap().is_empty());
    }
}
