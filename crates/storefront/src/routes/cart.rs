//! Cart route handlers.
//!
//! The cart lives in the session under `listaProductos`. Mutations answer
//! with the updated [`CartView`] and an `HX-Trigger: cart-updated` header so
//! fragments listening for it re-fetch `/cart/fragment` and `/cart/count`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{AppendHeaders, IntoResponse},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use tienda_core::{CartLedger, CartLineItem, CartState, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::OptionalUser;
use crate::models::PurchaseReceipt;
use crate::services::{CartSession, CheckoutService};
use crate::state::AppState;

/// Header telling HTMX listeners the cart changed.
const CART_UPDATED: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub product_id: ProductId,
    pub title: String,
    pub quantity: u32,
    /// Formatted unit price, e.g. `$5.200`.
    pub price: String,
    /// Formatted line subtotal.
    pub line_price: String,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItemView>,
    /// Formatted total.
    pub total: String,
    /// Total in whole pesos.
    pub total_amount: i64,
    pub item_count: u32,
    pub state: CartState,
}

impl CartView {
    /// Whether the "empty cart" notice should be shown.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state == CartState::Empty
    }
}

impl From<&CartLineItem> for CartItemView {
    fn from(item: &CartLineItem) -> Self {
        Self {
            product_id: item.product_id,
            title: item.product_title.clone(),
            quantity: item.quantity,
            price: item.unit_price.display(),
            line_price: item.subtotal().display(),
        }
    }
}

impl From<&CartLedger> for CartView {
    fn from(cart: &CartLedger) -> Self {
        let total = cart.total();
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            total: total.display(),
            total_amount: total.amount(),
            item_count: cart.item_count(),
            state: cart.state(),
        }
    }
}

/// Add/remove request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineRequest {
    #[serde(alias = "productoId", alias = "id")]
    pub product_id: ProductId,
}

/// Checkout query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutParams {
    /// Keep the cart after a successful purchase.
    #[serde(default)]
    pub keep_cart: bool,
}

/// Cart items fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Current cart as JSON.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = CartSession::new(&session).load().await?;
    Ok(Json(CartView::from(&cart)))
}

/// Cart items fragment, rendered in full on every request.
#[instrument(skip(session))]
pub async fn fragment(session: Session) -> Result<CartItemsTemplate> {
    let cart = CartSession::new(&session).load().await?;
    Ok(CartItemsTemplate {
        cart: CartView::from(&cart),
    })
}

/// Cart count badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<CartCountTemplate> {
    let cart = CartSession::new(&session).load().await?;
    Ok(CartCountTemplate {
        count: cart.item_count(),
    })
}

/// Add one unit of a product.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CartLineRequest>,
) -> Result<impl IntoResponse> {
    let product = state
        .db()
        .products()
        .get(request.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", request.product_id)))?;

    let cart = CartSession::new(&session).add(&product).await?;
    Ok((AppendHeaders([CART_UPDATED]), Json(CartView::from(&cart))))
}

/// Remove a product's line. Removing a product not in the cart is a no-op.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Json(request): Json<CartLineRequest>,
) -> Result<impl IntoResponse> {
    let cart = CartSession::new(&session).remove(request.product_id).await?;
    Ok((AppendHeaders([CART_UPDATED]), Json(CartView::from(&cart))))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<impl IntoResponse> {
    CartSession::new(&session).clear().await?;
    Ok((
        AppendHeaders([CART_UPDATED]),
        Json(CartView::from(&CartLedger::new())),
    ))
}

/// Submit the cart as a purchase by the logged-in user.
///
/// The cart is cleared afterwards unless `keep_cart=true`. On failure it is
/// left as it was.
#[instrument(skip(state, session, user))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Query(params): Query<CheckoutParams>,
) -> Result<impl IntoResponse> {
    let carts = CartSession::new(&session);
    let cart = carts.load().await?;

    let receipt: PurchaseReceipt = CheckoutService::new(state.db())
        .checkout(&cart, user.as_ref())
        .await?;

    if !params.keep_cart {
        carts.clear().await?;
    }

    Ok((
        StatusCode::CREATED,
        AppendHeaders([CART_UPDATED]),
        Json(receipt),
    ))
}
