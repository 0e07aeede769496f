//! Catalog product types.

use serde::{Deserialize, Serialize};

use tienda_core::validation::ValidationErrors;
use tienda_core::{Category, Price, ProductId};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price in whole pesos.
    pub price: Price,
    pub description: String,
    pub category: Category,
    /// Image path or URL, may be empty.
    pub image_ref: String,
}

/// Validated product fields, used for both create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub description: String,
    pub category: Category,
    pub image_ref: String,
}

/// A price as submitted: a JSON number or a display string like `"$1.020"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriceField {
    Amount(i64),
    Text(String),
}

impl Default for PriceField {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// Admin product form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductForm {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "precio")]
    pub price: PriceField,
    #[serde(alias = "descripcion")]
    pub description: String,
    #[serde(alias = "tipoProducto")]
    pub category: String,
    #[serde(alias = "urlImg")]
    pub image_ref: String,
}

impl ProductForm {
    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns every failed rule at once.
    pub fn validate(&self) -> Result<NewProduct, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name);
        errors.require("description", &self.description);

        let price = match &self.price {
            PriceField::Amount(amount) => Price::new(*amount),
            PriceField::Text(text) if text.trim().is_empty() => {
                errors.push("price", "is required");
                Ok(Price::ZERO)
            }
            PriceField::Text(text) => Price::parse_display(text),
        }
        .unwrap_or_else(|e| {
            errors.push("price", e.to_string());
            Price::ZERO
        });

        let category = if errors.require("category", &self.category) {
            self.category
                .parse::<Category>()
                .map_err(|e| errors.push("category", e.to_string()))
                .ok()
        } else {
            None
        };

        errors.into_result()?;
        let Some(category) = category else {
            return Err(ValidationErrors::single("category", "is required"));
        };

        Ok(NewProduct {
            name: self.name.trim().to_owned(),
            price,
            description: self.description.trim().to_owned(),
            category,
            image_ref: self.image_ref.trim().to_owned(),
        })
    }
}
