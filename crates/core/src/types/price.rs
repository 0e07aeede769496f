//! Catalog prices in whole Chilean pesos.
//!
//! The peso has no minor unit in circulation, so a price is a non-negative
//! integer. Display strings (`$5.200`) are produced only when rendering and
//! are never used for arithmetic.

use core::fmt;
use core::iter::Sum;

use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The text could not be read as a peso amount.
    #[error("invalid price: {0:?}")]
    Invalid(String),
}

/// A non-negative amount in Chilean pesos.
///
/// Deserializes from either a JSON integer (`5200`) or a display string
/// (`"$5.200"`, `"5,200"`), which is how the admin product form submits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Price(i64);

#[derive(Deserialize)]
#[serde(untagged)]
enum PriceRepr {
    Amount(i64),
    Text(String),
}

impl Price {
    /// Zero pesos.
    pub const ZERO: Self = Self(0);

    /// Create a price from a peso amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount` is below zero.
    pub const fn new(amount: i64) -> Result<Self, PriceError> {
        if amount < 0 {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// The amount in pesos.
    #[must_use]
    pub const fn amount(self) -> i64 {
        self.0
    }

    /// Price of `quantity` units, saturating at `i64::MAX`.
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as i64))
    }

    /// Sum of two prices, saturating at `i64::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Format for display using Chilean grouping (e.g. `$5.200`).
    #[must_use]
    pub fn display(self) -> String {
        let digits = self.0.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        grouped.push('$');
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        grouped
    }

    /// Parse a display string back into a price.
    ///
    /// Accepts an optional leading `$`, surrounding whitespace, and either `.`
    /// or `,` as thousands separator: `"$5.200"`, `"5,200"` and `"5200"` all
    /// parse to 5200.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Invalid` if anything other than digits remains
    /// after stripping, or if the amount overflows.
    pub fn parse_display(text: &str) -> Result<Self, PriceError> {
        let trimmed = text.trim();
        let body = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
        let digits: String = body.chars().filter(|c| !matches!(c, '.' | ',')).collect();

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PriceError::Invalid(text.to_owned()));
        }

        digits
            .parse::<i64>()
            .map(Self)
            .map_err(|_| PriceError::Invalid(text.to_owned()))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl TryFrom<i64> for Price {
    type Error = PriceError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let parsed = match PriceRepr::deserialize(deserializer)? {
            PriceRepr::Amount(amount) => Self::new(amount),
            PriceRepr::Text(text) => Self::parse_display(&text),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}

impl From<Price> for i64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::new(0).unwrap().display(), "$0");
        assert_eq!(Price::new(680).unwrap().display(), "$680");
        assert_eq!(Price::new(1020).unwrap().display(), "$1.020");
        assert_eq!(Price::new(5200).unwrap().display(), "$5.200");
        assert_eq!(Price::new(1_234_567).unwrap().display(), "$1.234.567");
    }

    #[test]
    fn test_parse_display_accepts_both_separator_styles() {
        assert_eq!(Price::parse_display("$5.200").unwrap().amount(), 5200);
        assert_eq!(Price::parse_display("$5,200").unwrap().amount(), 5200);
        assert_eq!(Price::parse_display(" 2499 ").unwrap().amount(), 2499);
        assert_eq!(Price::parse_display("$ 1.290").unwrap().amount(), 1290);
    }

    #[test]
    fn test_parse_display_rejects_garbage() {
        assert!(Price::parse_display("").is_err());
        assert!(Price::parse_display("$").is_err());
        assert!(Price::parse_display("-500").is_err());
        assert!(Price::parse_display("12a").is_err());
    }

    #[test]
    fn test_new_rejects_negative() {
        assert_eq!(Price::new(-1), Err(PriceError::Negative));
    }

    #[test]
    fn test_times_and_sum() {
        let price = Price::new(5200).unwrap();
        assert_eq!(price.times(2).amount(), 10_400);
        assert_eq!(price.times(0), Price::ZERO);

        let total: Price = [price, Price::new(680).unwrap()].into_iter().sum();
        assert_eq!(total.amount(), 5880);
    }

    #[test]
    fn test_deserialize_number_or_display_string() {
        let from_number: Price = serde_json::from_str("5200").unwrap();
        let from_text: Price = serde_json::from_str("\"$5.200\"").unwrap();
        assert_eq!(from_number, from_text);

        assert!(serde_json::from_str::<Price>("-3").is_err());
        assert_eq!(serde_json::to_string(&from_text).unwrap(), "5200");
    }
}
