//! User roles.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Permission level of a directory user.
///
/// Serialized with the labels shown in the administration console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    /// Regular shopper.
    #[default]
    #[serde(rename = "Usuario")]
    User,
    /// Catalog and roster administrator.
    #[serde(rename = "Administrador")]
    Administrator,
}

impl Role {
    /// Label stored in the directory and sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "Usuario",
            Self::Administrator => "Administrador",
        }
    }

    /// Whether this role may use the administration endpoints.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Administrator)
    }

    /// Path a client should land on after logging in with this role.
    #[must_use]
    pub const fn landing_path(self) -> &'static str {
        match self {
            Self::User => "/",
            Self::Administrator => "/admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Usuario" => Ok(Self::User),
            "Administrador" => Ok(Self::Administrator),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}
