//! User roster route handlers. Every route requires an administrator.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use tienda_core::UserId;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{User, UserForm};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

fn not_found(id: UserId) -> AppError {
    AppError::NotFound(format!("User {id} not found"))
}

/// List every user.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    Ok(Json(state.db().users().list().await?))
}

/// Show one user.
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<User>> {
    let user = state
        .db()
        .users()
        .get(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(user))
}

/// Create a user with any role.
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(form): Json<UserForm>,
) -> Result<(StatusCode, Json<User>)> {
    let user = AuthService::new(state.db()).create_user(&form).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Replace a user's fields.
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
    Json(form): Json<UserForm>,
) -> Result<Json<User>> {
    let user = AuthService::new(state.db())
        .update_user(id, &form)
        .await
        .map_err(|e| match e {
            AuthError::UserNotFound => not_found(id),
            other => other.into(),
        })?;

    tracing::info!(user_id = %id, "User updated");
    Ok(Json(user))
}

/// Delete a user and their purchases.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<StatusCode> {
    if id == admin.id {
        return Err(AppError::BadRequest(
            "Administrators cannot delete their own account".to_string(),
        ));
    }
    if !state.db().users().delete(id).await? {
        return Err(not_found(id));
    }

    tracing::info!(user_id = %id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
