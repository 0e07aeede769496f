//! Authentication service.
//!
//! Password login against the user directory, self-registration and the
//! admin/profile user edits that share the same form rules.

mod error;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{NaiveDate, Utc};

use tienda_core::{Role, UserId};

use crate::db::{Database, UserRepository};
use crate::models::{NewUser, ProfileForm, User, UserChanges, UserForm, ValidatedUser};

/// Hash checked when the username is unknown, so both login failures pay
/// for one Argon2 verification.
static UNKNOWN_USER_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("unknown-user-placeholder").ok());

/// Authentication service.
///
/// Handles registration, password login and user edits.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    today: NaiveDate,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(db: &'a Database) -> Self {
        Self {
            users: db.users(),
            today: Utc::now().date_naive(),
        }
    }

    /// Use `today` instead of the current date for age checks.
    #[must_use]
    pub const fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Self-registration. The new account always gets `Role::User`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` with every failed form rule.
    /// Returns `AuthError::UsernameTaken` if the username is registered.
    pub async fn register(&self, form: &UserForm) -> Result<User, AuthError> {
        let fields = form.validate(self.today, true)?;
        self.insert(fields, Role::User).await
    }

    /// Create a user from the admin form, honoring its role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` with every failed form rule.
    /// Returns `AuthError::UsernameTaken` if the username is registered.
    pub async fn create_user(&self, form: &UserForm) -> Result<User, AuthError> {
        let fields = form.validate(self.today, true)?;
        self.insert(fields, form.role.unwrap_or_default()).await
    }

    async fn insert(&self, fields: ValidatedUser, role: Role) -> Result<User, AuthError> {
        let password = fields.password.as_deref().unwrap_or_default();
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&NewUser {
                full_name: fields.full_name,
                username: fields.username,
                email: fields.email,
                shipping_address: fields.shipping_address,
                birth_date: fields.birth_date,
                role,
                password_hash,
            })
            .await
            .map_err(AuthError::from_write)?;

        tracing::info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    // =========================================================================
    // Edits
    // =========================================================================

    /// Replace a user's fields from the admin form.
    ///
    /// Blank password fields keep the stored hash; a missing role keeps the
    /// current role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` with every failed form rule.
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    /// Returns `AuthError::UsernameTaken` if the new username belongs to
    /// someone else.
    pub async fn update_user(&self, id: UserId, form: &UserForm) -> Result<User, AuthError> {
        let fields = form.validate(self.today, false)?;
        let changes = changes_from(fields, true, form.role)?;
        self.users
            .update(id, &changes)
            .await
            .map_err(AuthError::from_write)
    }

    /// Edit the logged-in user's own profile. Username and role stay as
    /// they are.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` with every failed form rule.
    /// Returns `AuthError::UserNotFound` if the user was deleted meanwhile.
    pub async fn update_profile(&self, user: &User, form: &ProfileForm) -> Result<User, AuthError> {
        let fields = form.validate(&user.username, self.today)?;
        let changes = changes_from(fields, false, None)?;
        self.users
            .update(user.id, &changes)
            .await
            .map_err(AuthError::from_write)
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Check a username and password against the directory.
    ///
    /// Does not touch the logged-in flag; see `IdentityTracker::login`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username is unknown or
    /// the password is wrong.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let Some((user, password_hash)) = self.users.get_credentials(username.trim()).await?
        else {
            if let Some(hash) = UNKNOWN_USER_HASH.as_deref() {
                let _ = verify_password(password, hash);
            }
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, id: UserId) -> Result<User, AuthError> {
        self.users.get(id).await?.ok_or(AuthError::UserNotFound)
    }
}

fn changes_from(
    fields: ValidatedUser,
    change_username: bool,
    role: Option<Role>,
) -> Result<UserChanges, AuthError> {
    let password_hash = fields.password.as_deref().map(hash_password).transpose()?;

    Ok(UserChanges {
        full_name: fields.full_name,
        username: change_username.then_some(fields.username),
        email: fields.email,
        shipping_address: fields.shipping_address,
        birth_date: fields.birth_date,
        role,
        password_hash,
    })
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()
    }

    fn registration(username: &str) -> UserForm {
        UserForm {
            full_name: "Juan Pérez".into(),
            username: username.into(),
            email: "juan@example.cl".into(),
            shipping_address: "Av. Siempre Viva 742".into(),
            birth_date: "1990-05-17".into(),
            password: "Admin123".into(),
            password_confirmation: "Admin123".into(),
            role: Some(Role::Administrator),
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Admin123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Admin123", &hash).is_ok());
        assert!(matches!(
            verify_password("admin123", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_ignores_requested_role() {
        let db = Database::memory();
        let auth = AuthService::new(&db).with_today(today());

        let user = auth.register(&registration("jperez")).await.unwrap();
        assert_eq!(user.role, Role::User);
        assert!(!user.logged_in);
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let db = Database::memory();
        let auth = AuthService::new(&db).with_today(today());

        auth.register(&registration("jperez")).await.unwrap();
        let err = auth.register(&registration("jperez")).await.unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));
    }

    #[tokio::test]
    async fn test_authenticate_does_not_distinguish_failures() {
        let db = Database::memory();
        let auth = AuthService::new(&db).with_today(today());
        auth.register(&registration("jperez")).await.unwrap();

        assert!(auth.authenticate("jperez", "Admin123").await.is_ok());
        assert!(matches!(
            auth.authenticate("jperez", "Wrong123").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.authenticate("nadie", "Admin123").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_unknown_user_hash_is_a_valid_argon2_hash() {
        let hash = UNKNOWN_USER_HASH.as_deref().unwrap();
        assert!(PasswordHash::new(hash).is_ok());
        assert!(matches!(
            verify_password("Admin123", hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_profile_update_keeps_password_when_blank() {
        let db = Database::memory();
        let auth = AuthService::new(&db).with_today(today());
        let user = auth.register(&registration("jperez")).await.unwrap();

        let form = ProfileForm {
            full_name: "Juan Pablo Pérez".into(),
            email: "jp@example.cl".into(),
            shipping_address: String::new(),
            birth_date: "17-05-1990".into(),
            ..ProfileForm::default()
        };
        let updated = auth.update_profile(&user, &form).await.unwrap();
        assert_eq!(updated.full_name, "Juan Pablo Pérez");
        assert_eq!(updated.username, "jperez");
        assert!(auth.authenticate("jperez", "Admin123").await.is_ok());
    }

    #[tokio::test]
    async fn test_underage_registration_is_rejected() {
        let db = Database::memory();
        let auth = AuthService::new(&db).with_today(today());
        let form = UserForm {
            birth_date: "2020-01-01".into(),
            ..registration("nino")
        };

        let Err(AuthError::Validation(errors)) = auth.register(&form).await else {
            panic!("expected validation failure");
        };
        assert!(errors.has_field("birthDate"));
        assert!(db.users().list().await.unwrap().is_empty());
    }
}
