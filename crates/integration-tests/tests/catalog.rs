//! Catalog endpoints.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use tienda_core::{Category, Role};
use tienda_integration_tests::TestApp;

#[tokio::test]
async fn lists_filters_and_searches_products() {
    let app = TestApp::spawn().await;
    app.seed_product("Cloro Gel Briks Citrus 900ml", 1050, Category::Limpieza).await;
    app.seed_product("Lavaloza Verde Briks 2 Lts", 1430, Category::Limpieza).await;
    app.seed_product("Toalla de papel Nobby Fit", 680, Category::Papel).await;
    let browser = app.browser();

    let all: Vec<Value> = browser.get("/productos").await.json().await.unwrap();
    assert_eq!(all.len(), 3);

    let limpieza: Vec<Value> = browser
        .get("/productos/tipo/limpieza")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(limpieza.len(), 2);
    assert!(limpieza.iter().all(|p| p["category"] == "limpieza"));

    let briks: Vec<Value> = browser
        .get("/productos/nombre/Briks")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(briks.len(), 2);

    let none: Vec<Value> = browser
        .get("/productos/nombre/Shampoo")
        .await
        .json()
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn unknown_category_is_a_bad_request() {
    let app = TestApp::spawn().await;

    let resp = app.browser().get("/productos/tipo/jardineria").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_product_is_not_found() {
    let app = TestApp::spawn().await;

    let resp = app.browser().get("/productos/99").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_administrators_edit_the_catalog() {
    let app = TestApp::spawn().await;
    app.seed_user("jperez", Role::User).await;
    app.seed_user("admin", Role::Administrator).await;
    let product = json!({
        "name": "Suavizante Doña Tuti Aloe Vera 1000ml",
        "price": "$1.100",
        "description": "Suavizante",
        "category": "cuidado_ropa",
    });

    let anonymous = app.browser();
    let resp = anonymous.post("/productos", &product).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let shopper = app.browser();
    shopper.login("jperez").await;
    let resp = shopper.post("/productos", &product).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let admin = app.browser();
    admin.login("admin").await;
    let resp = admin.post("/productos", &product).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["price"], 1100);
    let id = created["id"].as_i64().unwrap();

    let resp = admin
        .put(
            &format!("/productos/{id}"),
            &json!({
                "name": "Suavizante Doña Tuti Aloe Vera 1000ml",
                "price": 1200,
                "description": "Suavizante",
                "category": "cuidado_ropa",
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["price"], 1200);

    let resp = admin.delete(&format!("/productos/{id}")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = admin.delete(&format!("/productos/{id}")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn updating_an_absent_product_leaves_the_catalog_alone() {
    let app = TestApp::spawn().await;
    app.seed_user("admin", Role::Administrator).await;
    app.seed_product("Toalla de papel Nobby Fit", 680, Category::Papel).await;
    let admin = app.browser();
    admin.login("admin").await;

    let resp = admin
        .put(
            "/productos/999",
            &json!({
                "name": "Fantasma",
                "price": 100,
                "description": "No existe",
                "category": "papel",
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let all: Vec<Value> = admin.get("/productos").await.json().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0]["name"], "Toalla de papel Nobby Fit");
    assert_eq!(all[0]["price"], 680);
}

#[tokio::test]
async fn invalid_product_reports_every_field() {
    let app = TestApp::spawn().await;
    app.seed_user("admin", Role::Administrator).await;
    let admin = app.browser();
    admin.login("admin").await;

    let resp = admin
        .post("/productos", &json!({ "name": "", "price": -5, "category": "otro" }))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"price"));
    assert!(fields.contains(&"category"));
}
