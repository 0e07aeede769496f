//! Authentication extractors.
//!
//! Each extractor refreshes the session identity against the directory, so a
//! user deleted or logged out elsewhere is treated as anonymous.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// Extractor that requires a logged-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hola, {}!", user.full_name)
/// }
/// ```
pub struct RequireUser(pub User);

/// Extractor that requires a logged-in `Administrador`.
///
/// Anonymous requests get 401, other roles 403.
pub struct RequireAdmin(pub User);

/// Extractor that optionally gets the current user.
pub struct OptionalUser(pub Option<User>);

async fn refresh_identity(parts: &Parts, state: &AppState) -> Result<Option<User>, AppError> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

    Ok(state.identity(session).refresh().await?)
}

impl<S> FromRequestParts<S> for OptionalUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        Ok(Self(refresh_identity(parts, &state).await?))
    }
}

impl<S> FromRequestParts<S> for RequireUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        refresh_identity(parts, &state)
            .await?
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("Log in to continue".to_string()))
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireUser(user) = RequireUser::from_request_parts(parts, state).await?;

        if !user.role.is_admin() {
            tracing::warn!(user_id = %user.id, path = %parts.uri.path(), "Admin route denied");
            return Err(AppError::Forbidden(
                "Administrator access required".to_string(),
            ));
        }

        Ok(Self(user))
    }
}
