//! Registration, login, logout and profile.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use tienda_core::{Category, Role};
use tienda_integration_tests::{PASSWORD, TestApp};

fn registration(username: &str) -> Value {
    json!({
        "fullName": "Juan Pérez",
        "username": username,
        "email": "jperez@tienda.cl",
        "shippingAddress": "Los Aromos 123",
        "birthDate": "1995-03-02",
        "password": PASSWORD,
        "passwordConfirmation": PASSWORD,
        "role": "Administrador",
    })
}

#[tokio::test]
async fn registered_users_are_shoppers_and_can_log_in() {
    let app = TestApp::spawn().await;
    let browser = app.browser();

    let resp = browser.post("/auth/register", &registration("jperez")).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user: Value = resp.json().await.unwrap();
    assert_eq!(user["role"], "Usuario");
    assert!(user.get("passwordHash").is_none());

    let login = browser.login("jperez").await;
    assert_eq!(login["role"], "Usuario");
    assert_eq!(login["redirect"], "/");
    assert_eq!(login["user"]["loggedIn"], true);

    let me: Value = browser.get("/auth/me").await.json().await.unwrap();
    assert_eq!(me["user"]["username"], "jperez");
}

#[tokio::test]
async fn duplicate_usernames_conflict() {
    let app = TestApp::spawn().await;
    let browser = app.browser();
    browser.post("/auth/register", &registration("jperez")).await;

    let resp = browser.post("/auth/register", &registration("jperez")).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn registration_reports_every_invalid_field() {
    let app = TestApp::spawn().await;

    let resp = app
        .browser()
        .post(
            "/auth/register",
            &json!({
                "fullName": "",
                "username": "j perez",
                "email": "not-an-email",
                "birthDate": "2024-01-01",
                "password": "abc",
                "passwordConfirmation": "abd",
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    for field in ["fullName", "username", "email", "birthDate", "password", "passwordConfirmation"] {
        assert!(fields.contains(&field), "missing {field}");
    }
}

#[tokio::test]
async fn wrong_password_is_unauthorized_and_changes_nothing() {
    let app = TestApp::spawn().await;
    app.seed_user("jperez", Role::User).await;
    let browser = app.browser();

    let resp = browser
        .post("/auth/login", &json!({ "username": "jperez", "password": "Wrong123" }))
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = browser
        .post("/auth/login", &json!({ "username": "nadie", "password": PASSWORD }))
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let me: Value = browser.get("/auth/me").await.json().await.unwrap();
    assert!(me["user"].is_null());
    let stored = app.db.users().get_by_username("jperez").await.unwrap().unwrap();
    assert!(!stored.logged_in);
}

#[tokio::test]
async fn administrators_land_on_the_console() {
    let app = TestApp::spawn().await;
    app.seed_user("admin", Role::Administrator).await;

    let login = app.browser().login("admin").await;
    assert_eq!(login["role"], "Administrador");
    assert_eq!(login["redirect"], "/admin");
}

#[tokio::test]
async fn logout_clears_the_identity_but_keeps_the_cart() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("jperez", Role::User).await;
    let toalla = app.seed_product("Toalla de papel Nobby Fit", 680, Category::Papel).await;
    let browser = app.browser();
    browser.login("jperez").await;
    browser.add_to_cart(toalla.id).await;

    let body: Value = browser.post("/auth/logout", &json!({})).await.json().await.unwrap();
    assert_eq!(body["loggedOut"], true);

    let me: Value = browser.get("/auth/me").await.json().await.unwrap();
    assert!(me["user"].is_null());
    assert!(!app.db.users().get(user.id).await.unwrap().unwrap().logged_in);
    let cart: Value = browser.get("/cart").await.json().await.unwrap();
    assert_eq!(cart["itemCount"], 1);

    // logging out twice is harmless
    let body: Value = browser.post("/auth/logout", &json!({})).await.json().await.unwrap();
    assert_eq!(body["loggedOut"], false);
}

#[tokio::test]
async fn logout_can_clear_the_cart() {
    let app = TestApp::spawn().await;
    app.seed_user("jperez", Role::User).await;
    let toalla = app.seed_product("Toalla de papel Nobby Fit", 680, Category::Papel).await;
    let browser = app.browser();
    browser.login("jperez").await;
    browser.add_to_cart(toalla.id).await;

    browser.post("/auth/logout?clear_cart=true", &json!({})).await;

    let cart: Value = browser.get("/cart").await.json().await.unwrap();
    assert_eq!(cart["state"], "empty");
}

#[tokio::test]
async fn profile_edits_keep_username_and_role() {
    let app = TestApp::spawn().await;
    app.seed_user("jperez", Role::User).await;
    let browser = app.browser();

    let resp = browser.get("/account/profile").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    browser.login("jperez").await;
    let resp = browser
        .put(
            "/account/profile",
            &json!({
                "fullName": "Juan Pablo Pérez",
                "email": "jp@tienda.cl",
                "shippingAddress": "Nueva 456",
                "birthDate": "1990-05-17",
                "password": "",
                "passwordConfirmation": "",
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let user: Value = resp.json().await.unwrap();
    assert_eq!(user["fullName"], "Juan Pablo Pérez");
    assert_eq!(user["username"], "jperez");
    assert_eq!(user["role"], "Usuario");

    // blank password fields keep the old password
    browser.post("/auth/logout", &json!({})).await;
    browser.login("jperez").await;
}
