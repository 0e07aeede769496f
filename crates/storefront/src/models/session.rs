//! Session-related types.
//!
//! Types stored in the session for identity and cart state.

use serde::{Deserialize, Serialize};

use tienda_core::{Role, UserId};

use super::user::User;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user. The
/// directory stays authoritative: the tracker re-reads the user on refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's directory ID.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Role at login time.
    pub role: Role,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for the cart line items.
    pub const CART: &str = "listaProductos";

    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
