//! Domain models for the storefront.

pub mod product;
pub mod purchase;
pub mod session;
pub mod user;

pub use product::{NewProduct, Product, ProductForm};
pub use purchase::{PurchaseReceipt, ReceiptLine};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{NewUser, ProfileForm, User, UserChanges, UserForm, ValidatedUser};
