//! Authentication route handlers.
//!
//! Registration, password login and logout against the user directory.
//! Session identity is managed by [`crate::services::IdentityTracker`].

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use tienda_core::Role;

use crate::error::Result;
use crate::models::{User, UserForm};
use crate::services::{AuthService, CartSession};
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(alias = "nombreUsuario")]
    pub username: String,
    #[serde(alias = "contrasena")]
    pub password: String,
}

/// Successful login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: User,
    pub role: Role,
    /// Where the client should navigate next.
    pub redirect: &'static str,
}

/// Logout query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct LogoutParams {
    /// Also empty the session cart.
    #[serde(default)]
    pub clear_cart: bool,
}

/// Logout outcome. `logged_out` is `false` when nobody was logged in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub logged_out: bool,
}

/// Current identity; `user` is `null` when nobody is logged in.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: Option<User>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Self-registration. New accounts are always regular users.
#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<UserForm>,
) -> Result<(StatusCode, Json<User>)> {
    let user = AuthService::new(state.db()).register(&form).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Password login.
#[instrument(skip(state, session, request), fields(username = %request.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let outcome = state
        .identity(&session)
        .login(&request.username, &request.password)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Login failed"))?;

    Ok(Json(LoginResponse {
        user: outcome.user,
        role: outcome.role,
        redirect: outcome.landing_path,
    }))
}

/// Logout. Succeeds even when nobody is logged in.
#[instrument(skip(state, session))]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<LogoutParams>,
) -> Result<Json<LogoutResponse>> {
    let logged_out = state.identity(&session).logout().await?;

    if params.clear_cart {
        CartSession::new(&session).clear().await?;
    }

    Ok(Json(LogoutResponse { logged_out }))
}

/// Refresh and return the current identity.
#[instrument(skip(state, session))]
pub async fn me(State(state): State<AppState>, session: Session) -> Result<Json<MeResponse>> {
    let user = state.identity(&session).refresh().await?;
    Ok(Json(MeResponse { user }))
}
