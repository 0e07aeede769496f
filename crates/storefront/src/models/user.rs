//! User domain types and forms.
//!
//! [`User`] is what the API returns: it never carries the password hash.
//! Forms arrive as loose strings so that every rule failure can be
//! collected and reported at once.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use tienda_core::validation::{self, ValidationErrors};
use tienda_core::{Email, Role, UserId};

/// A directory user (domain type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Full name.
    pub full_name: String,
    /// Login key, unique across the directory.
    pub username: String,
    /// Contact email.
    pub email: Email,
    /// Shipping address, may be empty.
    pub shipping_address: String,
    /// Date of birth.
    pub birth_date: NaiveDate,
    /// Whether the user is currently logged in somewhere.
    pub logged_in: bool,
    /// Permission level.
    pub role: Role,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

/// Validated data for a new directory entry.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub username: String,
    pub email: Email,
    pub shipping_address: String,
    pub birth_date: NaiveDate,
    pub role: Role,
    pub password_hash: String,
}

/// Validated changes to an existing directory entry.
///
/// `None` fields keep their stored value.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub full_name: String,
    pub username: Option<String>,
    pub email: Email,
    pub shipping_address: String,
    pub birth_date: NaiveDate,
    pub role: Option<Role>,
    pub password_hash: Option<String>,
}

/// Registration and admin user form.
///
/// `role` is honored only on the admin endpoints; self-registration always
/// creates a `Usuario`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserForm {
    #[serde(alias = "nombreCompleto")]
    pub full_name: String,
    #[serde(alias = "nombreUsuario")]
    pub username: String,
    #[serde(alias = "correo")]
    pub email: String,
    #[serde(alias = "direccionDespacho")]
    pub shipping_address: String,
    #[serde(alias = "fechaNacimiento")]
    pub birth_date: String,
    #[serde(alias = "contrasena")]
    pub password: String,
    pub password_confirmation: String,
    pub role: Option<Role>,
}

/// Profile edit form for the logged-in user.
///
/// The username cannot be changed here. Leaving both password fields blank
/// keeps the current password.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileForm {
    pub full_name: String,
    pub email: String,
    pub shipping_address: String,
    pub birth_date: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Form fields that passed every rule.
///
/// `password` is the plaintext still to be hashed, or `None` to keep the
/// current one.
#[derive(Debug, Clone)]
pub struct ValidatedUser {
    pub full_name: String,
    pub username: String,
    pub email: Email,
    pub shipping_address: String,
    pub birth_date: NaiveDate,
    pub password: Option<String>,
}

impl UserForm {
    /// Check every field.
    ///
    /// With `password_required` unset, blank password fields mean "keep the
    /// current password".
    ///
    /// # Errors
    ///
    /// Returns every failed rule at once.
    pub fn validate(
        &self,
        today: NaiveDate,
        password_required: bool,
    ) -> Result<ValidatedUser, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("username", &self.username);
        if self.username.trim().chars().any(char::is_whitespace) {
            errors.push("username", "must not contain spaces");
        }

        let common = CommonFields {
            full_name: &self.full_name,
            email: &self.email,
            birth_date: &self.birth_date,
            password: &self.password,
            password_confirmation: &self.password_confirmation,
        };
        let (email, birth_date, password) = common.check(&mut errors, today, password_required);

        errors.into_result()?;
        let (Some(email), Some(birth_date)) = (email, birth_date) else {
            return Err(ValidationErrors::single("form", "is incomplete"));
        };

        Ok(ValidatedUser {
            full_name: self.full_name.trim().to_owned(),
            username: self.username.trim().to_owned(),
            email,
            shipping_address: self.shipping_address.trim().to_owned(),
            birth_date,
            password,
        })
    }
}

impl ProfileForm {
    /// Check every field; the username is carried over from `username`.
    ///
    /// # Errors
    ///
    /// Returns every failed rule at once.
    pub fn validate(&self, username: &str, today: NaiveDate) -> Result<ValidatedUser, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let common = CommonFields {
            full_name: &self.full_name,
            email: &self.email,
            birth_date: &self.birth_date,
            password: &self.password,
            password_confirmation: &self.password_confirmation,
        };
        let (email, birth_date, password) = common.check(&mut errors, today, false);

        errors.into_result()?;
        let (Some(email), Some(birth_date)) = (email, birth_date) else {
            return Err(ValidationErrors::single("form", "is incomplete"));
        };

        Ok(ValidatedUser {
            full_name: self.full_name.trim().to_owned(),
            username: username.to_owned(),
            email,
            shipping_address: self.shipping_address.trim().to_owned(),
            birth_date,
            password,
        })
    }
}

struct CommonFields<'a> {
    full_name: &'a str,
    email: &'a str,
    birth_date: &'a str,
    password: &'a str,
    password_confirmation: &'a str,
}

impl CommonFields<'_> {
    fn check(
        &self,
        errors: &mut ValidationErrors,
        today: NaiveDate,
        password_required: bool,
    ) -> (Option<Email>, Option<NaiveDate>, Option<String>) {
        errors.require("fullName", self.full_name);

        let email = if errors.require("email", self.email) {
            match Email::parse(self.email) {
                Ok(email) => Some(email),
                Err(e) => {
                    errors.push("email", e.to_string());
                    None
                }
            }
        } else {
            None
        };

        let birth_date = if errors.require("birthDate", self.birth_date) {
            match parse_birth_date(self.birth_date) {
                Some(date) => {
                    validation::check_min_age(errors, date, today);
                    Some(date)
                }
                None => {
                    errors.push("birthDate", "must be a date (YYYY-MM-DD)");
                    None
                }
            }
        } else {
            None
        };

        let wants_password = password_required
            || !self.password.is_empty()
            || !self.password_confirmation.is_empty();
        let password = if wants_password {
            validation::check_new_password(errors, self.password, self.password_confirmation);
            Some(self.password.to_owned())
        } else {
            None
        };

        (email, birth_date, password)
    }
}

/// Parse a birth date as `YYYY-MM-DD`, or the `DD-MM-YYYY` form used by the
/// legacy registration page.
#[must_use]
pub fn parse_birth_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%d-%m-%Y"))
        .ok()
}
