//! Authentication error types.

use thiserror::Error;

use tienda_core::ValidationErrors;

use crate::db::RepositoryError;

/// Errors that can occur during authentication and registration.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password. The two are never told apart.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Username is already registered.
    #[error("username already taken")]
    UsernameTaken,

    /// Form fields failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Session store error.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Map a store error from a write that may hit the username constraint.
    pub(crate) fn from_write(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => Self::UsernameTaken,
            RepositoryError::NotFound => Self::UserNotFound,
            other => Self::Repository(other),
        }
    }
}
