//! Product categories.
//!
//! The catalog is split into a fixed set of store sections. The wire form is
//! the section slug used in URLs such as `/productos/tipo/limpieza`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a category slug is not one of the known sections.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown product category: {0:?}")]
pub struct CategoryError(pub String);

/// Store section a product belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Shampoo, conditioner and other hair products.
    CuidadoCapilar,
    /// Laundry detergents, softeners and bar soap.
    CuidadoRopa,
    /// Household cleaning products.
    Limpieza,
    /// Toilet paper, paper towels and napkins.
    Papel,
}

impl Category {
    /// Every category, in menu order.
    pub const ALL: [Self; 4] = [
        Self::CuidadoCapilar,
        Self::CuidadoRopa,
        Self::Limpieza,
        Self::Papel,
    ];

    /// URL slug for this category.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::CuidadoCapilar => "cuidado_capilar",
            Self::CuidadoRopa => "cuidado_ropa",
            Self::Limpieza => "limpieza",
            Self::Papel => "papel",
        }
    }

    /// Human-readable section title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::CuidadoCapilar => "Cuidado Capilar",
            Self::CuidadoRopa => "Cuidado de la Ropa",
            Self::Limpieza => "Limpieza",
            Self::Papel => "Papel",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.slug().eq_ignore_ascii_case(needle))
            .ok_or_else(|| CategoryError(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_round_trip_for_every_category() {
        for category in Category::ALL {
            assert_eq!(category.slug().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("LIMPIEZA".parse::<Category>().unwrap(), Category::Limpieza);
    }

    #[test]
    fn test_parse_unknown_slug() {
        let err = "electronica".parse::<Category>().unwrap_err();
        assert_eq!(err.0, "electronica");
    }

    #[test]
    fn test_serde_uses_slug() {
        let json = serde_json::to_string(&Category::CuidadoRopa).unwrap();
        assert_eq!(json, "\"cuidado_ropa\"");
    }
}
