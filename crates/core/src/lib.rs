//! Tienda Core - Shared domain types and cart ledger.
//!
//! This crate provides the types used across all Tienda components:
//! - `storefront` - Storefront and administration HTTP service
//! - `cli` - Command-line tools for migrations, admin bootstrap and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure state - no I/O, no database
//! access, no HTTP. The cart ledger lives here so its arithmetic and merge
//! rules can be tested without a session store or rendering surface.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, categories and roles
//! - [`cart`] - Session cart ledger (add/remove/merge, totals)
//! - [`purchase`] - Purchase request payloads built at checkout
//! - [`validation`] - Form rule helpers shared by registration and admin forms

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod purchase;
pub mod types;
pub mod validation;

pub use cart::{CartLedger, CartLineItem, CartState};
pub use purchase::{MAX_LINE_QUANTITY, Purchase, PurchaseLine};
pub use types::*;
pub use validation::{FieldError, ValidationErrors};
