//! Account route handlers.
//!
//! These routes require a logged-in user.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::{ProfileForm, User};
use crate::services::AuthService;
use crate::state::AppState;

/// Show the logged-in user's profile.
#[instrument(skip(user), fields(user_id = %user.id))]
pub async fn profile(RequireUser(user): RequireUser) -> Json<User> {
    Json(user)
}

/// Edit the logged-in user's profile.
///
/// The username and role cannot be changed here; blank password fields keep
/// the current password.
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(form): Json<ProfileForm>,
) -> Result<Json<User>> {
    let updated = AuthService::new(state.db())
        .update_profile(&user, &form)
        .await?;

    tracing::info!("Profile updated");
    Ok(Json(updated))
}
