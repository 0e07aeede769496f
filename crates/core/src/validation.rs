//! Form validation helpers.
//!
//! Form checks collect every failing field into one [`ValidationErrors`]
//! value so clients can show all messages at once.

use core::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Minimum age, in whole years, to hold an account.
pub const MIN_AGE: u32 = 13;

/// Minimum password length in characters.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Maximum password length in characters.
pub const PASSWORD_MAX_LEN: usize = 18;

/// One failed rule on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Wire name of the field.
    pub field: &'static str,
    /// Message shown next to the field.
    pub message: String,
}

/// Every rule failure collected while checking a form.
#[derive(thiserror::Error, Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// No failures yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// A single failure.
    #[must_use]
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    /// Record a failure on `field`.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Record a "required" failure when `value` is blank.
    ///
    /// Returns whether the value was present.
    pub fn require(&mut self, field: &'static str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.push(field, "is required");
            return false;
        }
        true
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Whether any failure was recorded against `field`.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    /// `Ok(())` if nothing failed, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns the collected failures when there is at least one.
    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("validation failed")?;
        for (i, error) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{} {}", error.field, error.message)?;
        }
        Ok(())
    }
}

/// Check a new password against the account password policy.
///
/// Failures are recorded against `field`.
pub fn check_password_format(errors: &mut ValidationErrors, field: &'static str, password: &str) {
    let len = password.chars().count();
    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        errors.push(
            field,
            format!("must be between {PASSWORD_MIN_LEN} and {PASSWORD_MAX_LEN} characters"),
        );
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(field, "must contain at least one digit");
    }
    if !password.chars().any(char::is_uppercase) {
        errors.push(field, "must contain at least one uppercase letter");
    }
}

/// Check a password and its confirmation.
pub fn check_new_password(errors: &mut ValidationErrors, password: &str, confirmation: &str) {
    if !errors.require("password", password) {
        return;
    }
    check_password_format(errors, "password", password);
    if password != confirmation {
        errors.push("passwordConfirmation", "does not match the password");
    }
}

/// Whole years between `birth` and `today`.
///
/// Returns 0 for birth dates in the future.
#[must_use]
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> u32 {
    if birth > today {
        return 0;
    }
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}

/// Record a failure if someone born on `birth` is younger than [`MIN_AGE`].
pub fn check_min_age(errors: &mut ValidationErrors, birth: NaiveDate, today: NaiveDate) {
    if age_on(birth, today) < MIN_AGE {
        errors.push("birthDate", format!("you must be at least {MIN_AGE} years old"));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_password_policy() {
        let mut errors = ValidationErrors::new();
        check_password_format(&mut errors, "password", "Admin123");
        assert!(errors.is_empty());

        let mut errors = ValidationErrors::new();
        check_password_format(&mut errors, "password", "abc");
        assert_eq!(errors.errors().len(), 3);

        let mut errors = ValidationErrors::new();
        check_password_format(&mut errors, "password", "Abcdefghijklmnopqr1");
        assert_eq!(errors.errors().len(), 1);
    }

    #[test]
    fn test_confirmation_mismatch() {
        let mut errors = ValidationErrors::new();
        check_new_password(&mut errors, "Admin123", "Admin124");
        assert!(errors.has_field("passwordConfirmation"));
        assert!(!errors.has_field("password"));
    }

    #[test]
    fn test_blank_password_is_required_only() {
        let mut errors = ValidationErrors::new();
        check_new_password(&mut errors, "  ", "");
        assert_eq!(errors.errors().len(), 1);
        assert_eq!(errors.errors()[0].message, "is required");
    }

    #[test]
    fn test_age_on_birthday_boundary() {
        let birth = date(2010, 6, 15);
        assert_eq!(age_on(birth, date(2023, 6, 14)), 12);
        assert_eq!(age_on(birth, date(2023, 6, 15)), 13);
        assert_eq!(age_on(birth, date(2009, 1, 1)), 0);
    }

    #[test]
    fn test_min_age() {
        let mut errors = ValidationErrors::new();
        check_min_age(&mut errors, date(2015, 1, 1), date(2024, 1, 1));
        assert!(errors.has_field("birthDate"));

        let mut errors = ValidationErrors::new();
        check_min_age(&mut errors, date(1990, 1, 1), date(2024, 1, 1));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_display_and_into_result() {
        let mut errors = ValidationErrors::new();
        errors.require("username", "");
        errors.push("email", "is not a valid email address");

        assert_eq!(
            errors.to_string(),
            "validation failed: username is required; email is not a valid email address"
        );
        assert!(errors.clone().into_result().is_err());
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_serializes_as_field_list() {
        let errors = ValidationErrors::single("name", "is required");
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!([{"field": "name", "message": "is required"}])
        );
    }
}
