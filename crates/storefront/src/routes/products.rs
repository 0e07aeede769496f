//! Catalog route handlers.
//!
//! Reads are public; writes require an administrator.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use tienda_core::{Category, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Product, ProductForm};
use crate::state::AppState;

fn not_found(id: ProductId) -> AppError {
    AppError::NotFound(format!("Product {id} not found"))
}

/// List the whole catalog.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.db().products().list().await?))
}

/// Show one product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = state
        .db()
        .products()
        .get(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(product))
}

/// Products in one category section.
#[instrument(skip(state))]
pub async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Product>>> {
    let category = category
        .parse::<Category>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(Json(state.db().products().list_by_category(category).await?))
}

/// Products whose name contains the path fragment.
#[instrument(skip(state))]
pub async fn by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.db().products().search_by_name(&name).await?))
}

/// Add a product.
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(form): Json<ProductForm>,
) -> Result<(StatusCode, Json<Product>)> {
    let new = form.validate()?;
    let product = state.db().products().create(&new).await?;

    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product's fields.
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(form): Json<ProductForm>,
) -> Result<Json<Product>> {
    let changes = form.validate()?;
    let product = state
        .db()
        .products()
        .update(id, &changes)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => not_found(id),
            other => other.into(),
        })?;

    tracing::info!(product_id = %id, "Product updated");
    Ok(Json(product))
}

/// Remove a product.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    if !state.db().products().delete(id).await? {
        return Err(not_found(id));
    }

    tracing::info!(product_id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
