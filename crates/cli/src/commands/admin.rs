//! Administrator bootstrap command.
//!
//! # Usage
//!
//! ```bash
//! tienda-cli admin create -u admin -e admin@example.com -n "Admin Name" -p Admin123
//! ```
//!
//! The account goes through the same validation and Argon2 hashing as the
//! `/usuarios` endpoint, with the `Administrador` role.

use thiserror::Error;

use tienda_core::Role;
use tienda_storefront::db::Database;
use tienda_storefront::models::{User, UserForm};
use tienda_storefront::services::{AuthError, AuthService};

use super::ConnectError;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Command-line fields for a new administrator.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub birth_date: String,
}

/// Create a new administrator in the configured database.
///
/// # Errors
///
/// Returns `AdminError` if the database is unreachable, a field is invalid,
/// or the username is taken.
pub async fn create_user(admin: &NewAdmin) -> Result<(), AdminError> {
    let db = Database::Postgres(super::connect().await?);

    tracing::info!("Creating administrator: {}", admin.username);
    let user = create_admin(&db, admin).await?;

    tracing::info!(
        "Administrator created successfully! ID: {}, Username: {}",
        user.id,
        user.username
    );
    Ok(())
}

/// Register `admin` with the `Administrador` role.
///
/// # Errors
///
/// Returns `AuthError::Validation` for invalid fields and
/// `AuthError::UsernameTaken` for duplicates.
pub async fn create_admin(db: &Database, admin: &NewAdmin) -> Result<User, AuthError> {
    let form = UserForm {
        full_name: admin.full_name.clone(),
        username: admin.username.clone(),
        email: admin.email.clone(),
        shipping_address: String::new(),
        birth_date: admin.birth_date.clone(),
        password: admin.password.clone(),
        password_confirmation: admin.password.clone(),
        role: Some(Role::Administrator),
    };

    AuthService::new(db).create_user(&form).await
}
