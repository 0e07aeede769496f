//! Checkout: turn a session cart into a recorded purchase.

use thiserror::Error;
use tracing::instrument;

use tienda_core::{CartLedger, MAX_LINE_QUANTITY, Purchase};

use crate::db::{Database, PurchaseRepository, RepositoryError};
use crate::models::{PurchaseReceipt, User};

/// Errors from submitting a purchase.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("no user is logged in")]
    NotLoggedIn,

    /// The purchase names something the store rejects, or has no usable lines.
    #[error("invalid purchase: {0}")]
    InvalidPurchase(String),

    /// The store failed while recording the purchase.
    #[error("purchase submission failed: {0}")]
    Submission(#[source] RepositoryError),
}

impl From<RepositoryError> for CheckoutError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::InvalidReference(msg) => Self::InvalidPurchase(msg),
            other => Self::Submission(other),
        }
    }
}

/// Submits purchases to the ledger.
pub struct CheckoutService<'a> {
    purchases: PurchaseRepository<'a>,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self {
            purchases: db.purchases(),
        }
    }

    /// Submit the cart as a purchase by `user`.
    ///
    /// The cart itself is not touched; the caller decides whether to clear
    /// it after a successful submission.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if the cart has no lines.
    /// Returns `CheckoutError::NotLoggedIn` if there is no current user.
    /// Returns `CheckoutError::InvalidPurchase` if a product no longer exists.
    /// Returns `CheckoutError::Submission` if the store fails.
    #[instrument(skip_all, fields(lines = cart.len()))]
    pub async fn checkout(
        &self,
        cart: &CartLedger,
        user: Option<&User>,
    ) -> Result<PurchaseReceipt, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let user = user.ok_or(CheckoutError::NotLoggedIn)?;
        let purchase = Purchase::from_cart(user.id, cart).ok_or(CheckoutError::EmptyCart)?;

        self.submit(&purchase).await
    }

    /// Record an already-built purchase.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidPurchase` if the purchase has no lines,
    /// a zero or oversized quantity, or names an unknown user or product.
    /// Returns `CheckoutError::Submission` if the store fails.
    #[instrument(skip_all, fields(user_id = %purchase.user_id))]
    pub async fn submit(&self, purchase: &Purchase) -> Result<PurchaseReceipt, CheckoutError> {
        if purchase.line_items.is_empty() {
            return Err(CheckoutError::InvalidPurchase(
                "purchase has no line items".to_owned(),
            ));
        }
        if !purchase.has_positive_quantities() {
            return Err(CheckoutError::InvalidPurchase(
                "quantities must be at least 1".to_owned(),
            ));
        }
        if !purchase.quantities_within_limit() {
            return Err(CheckoutError::InvalidPurchase(format!(
                "quantities must be at most {MAX_LINE_QUANTITY}"
            )));
        }

        let receipt = self.purchases.create(purchase).await.inspect_err(|e| {
            tracing::warn!(error = %e, "Purchase submission failed");
        })?;

        tracing::info!(
            purchase_id = %receipt.id,
            total = receipt.total.amount(),
            "Purchase recorded"
        );
        Ok(receipt)
    }
}
