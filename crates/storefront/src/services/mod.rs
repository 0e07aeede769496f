//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration, password login and user edits
//! - `cart` - Session-backed cart ledger
//! - `identity` - Which directory user the session belongs to
//! - `checkout` - Submitting a cart as a purchase

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod identity;

pub use auth::{AuthError, AuthService};
pub use cart::CartSession;
pub use checkout::{CheckoutError, CheckoutService};
pub use identity::{IdentityTracker, LoginOutcome};
