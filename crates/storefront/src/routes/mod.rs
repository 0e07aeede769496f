//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Catalog (JSON)
//! GET    /productos                    - List products
//! GET    /productos/{id}               - Product detail
//! GET    /productos/tipo/{category}    - Products in a category
//! GET    /productos/nombre/{name}      - Products whose name contains {name}
//! POST   /productos                    - Create product (admin)
//! PUT    /productos/{id}               - Update product (admin)
//! DELETE /productos/{id}               - Delete product (admin)
//!
//! # Users (JSON, admin)
//! GET    /usuarios                     - List users
//! GET    /usuarios/{id}                - User detail
//! POST   /usuarios                     - Create user
//! PUT    /usuarios/{id}                - Update user
//! DELETE /usuarios/{id}                - Delete user
//!
//! # Purchases (JSON, logged in)
//! GET    /compras                      - Own purchases
//! POST   /compras                      - Record a purchase
//!
//! # Cart (session)
//! GET    /cart                         - Cart view
//! GET    /cart/fragment                - Cart items fragment (HTMX)
//! GET    /cart/count                   - Cart count badge (HTMX)
//! POST   /cart/add                     - Add one unit
//! POST   /cart/remove                  - Remove a line
//! POST   /cart/clear                   - Empty the cart
//! POST   /checkout                     - Submit the cart as a purchase
//!
//! # Auth
//! POST   /auth/register                - Self-registration
//! POST   /auth/login                   - Login
//! POST   /auth/logout                  - Logout
//! GET    /auth/me                      - Current identity
//!
//! # Account (logged in)
//! GET    /account/profile              - Own profile
//! PUT    /account/profile              - Edit own profile
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod products;
pub mod purchases;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/tipo/{category}", get(products::by_category))
        .route("/nombre/{name}", get(products::by_name))
}

/// Create the user roster routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index).post(users::create))
        .route(
            "/{id}",
            get(users::show).put(users::update).delete(users::delete),
        )
}

/// Create the purchase routes router.
pub fn purchase_routes() -> Router<AppState> {
    Router::new().route("/", get(purchases::index).post(purchases::create))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/fragment", get(cart::fragment))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new().route(
        "/profile",
        get(account::profile).put(account::update_profile),
    )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/productos", product_routes())
        .nest("/usuarios", user_routes())
        .nest("/compras", purchase_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(cart::checkout))
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
}
