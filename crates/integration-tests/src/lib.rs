//! Integration tests for Tienda.
//!
//! Each test boots the full storefront router on an ephemeral port with the
//! in-memory backend and drives it over HTTP with a cookie-keeping client,
//! so session behavior (cart, identity) is exercised end to end.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tienda-integration-tests
//! ```

use std::net::SocketAddr;

use reqwest::{Client, Response};
use serde_json::{Value, json};

use tienda_core::{Category, Price, ProductId, Role};
use tienda_storefront::build_app;
use tienda_storefront::config::StorefrontConfig;
use tienda_storefront::db::Database;
use tienda_storefront::models::{NewProduct, Product, User, UserForm};
use tienda_storefront::services::AuthService;
use tienda_storefront::state::AppState;

/// Password shared by every seeded account.
pub const PASSWORD: &str = "Admin123";

/// A running storefront plus direct access to its storage.
pub struct TestApp {
    pub addr: SocketAddr,
    pub db: Database,
}

impl TestApp {
    /// Start a storefront with development defaults.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn() -> Self {
        Self::spawn_with(StorefrontConfig::development()).await
    }

    /// Start a storefront with `config` and a fresh in-memory backend.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn_with(config: StorefrontConfig) -> Self {
        let db = Database::memory();
        let app = build_app(AppState::new(config, db.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server error");
        });

        Self { addr, db }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// A new browser: its own cookie jar, hence its own session.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn browser(&self) -> Browser<'_> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");
        Browser { app: self, client }
    }

    /// Insert a user directly into storage.
    ///
    /// # Panics
    ///
    /// Panics if the user is rejected.
    pub async fn seed_user(&self, username: &str, role: Role) -> User {
        let form = UserForm {
            full_name: format!("{username} Test"),
            username: username.to_owned(),
            email: format!("{username}@tienda.cl"),
            shipping_address: "Av. Siempre Viva 742".to_owned(),
            birth_date: "1990-05-17".to_owned(),
            password: PASSWORD.to_owned(),
            password_confirmation: PASSWORD.to_owned(),
            role: Some(role),
        };
        AuthService::new(&self.db)
            .create_user(&form)
            .await
            .expect("Failed to seed user")
    }

    /// Insert a product directly into storage.
    ///
    /// # Panics
    ///
    /// Panics if the product is rejected.
    pub async fn seed_product(&self, name: &str, price: i64, category: Category) -> Product {
        let product = NewProduct {
            name: name.to_owned(),
            price: Price::new(price).expect("Invalid seed price"),
            description: format!("{name} description"),
            category,
            image_ref: String::new(),
        };
        self.db
            .products()
            .create(&product)
            .await
            .expect("Failed to seed product")
    }
}

/// One cookie jar talking to a [`TestApp`].
pub struct Browser<'a> {
    app: &'a TestApp,
    pub client: Client,
}

impl Browser<'_> {
    /// GET `path`.
    ///
    /// # Panics
    ///
    /// Panics on transport errors.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.app.url(path))
            .send()
            .await
            .expect("GET failed")
    }

    /// POST `body` as JSON to `path`.
    ///
    /// # Panics
    ///
    /// Panics on transport errors.
    pub async fn post(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.app.url(path))
            .json(body)
            .send()
            .await
            .expect("POST failed")
    }

    /// PUT `body` as JSON to `path`.
    ///
    /// # Panics
    ///
    /// Panics on transport errors.
    pub async fn put(&self, path: &str, body: &Value) -> Response {
        self.client
            .put(self.app.url(path))
            .json(body)
            .send()
            .await
            .expect("PUT failed")
    }

    /// DELETE `path`.
    ///
    /// # Panics
    ///
    /// Panics on transport errors.
    pub async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(self.app.url(path))
            .send()
            .await
            .expect("DELETE failed")
    }

    /// Log in with the shared seed password.
    ///
    /// # Panics
    ///
    /// Panics unless the login succeeds.
    pub async fn login(&self, username: &str) -> Value {
        let resp = self
            .post(
                "/auth/login",
                &json!({ "username": username, "password": PASSWORD }),
            )
            .await;
        assert!(resp.status().is_success(), "login failed: {}", resp.status());
        resp.json().await.expect("Invalid login body")
    }

    /// Add one unit of `id` to the session cart.
    ///
    /// # Panics
    ///
    /// Panics unless the add succeeds.
    pub async fn add_to_cart(&self, id: ProductId) -> Value {
        let resp = self.post("/cart/add", &json!({ "productId": id })).await;
        assert!(resp.status().is_success(), "add failed: {}", resp.status());
        resp.json().await.expect("Invalid cart body")
    }
}
