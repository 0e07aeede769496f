//! Application state shared across handlers.

use std::sync::Arc;

use tower_sessions::Session;

use crate::config::StorefrontConfig;
use crate::db::Database;
use crate::services::IdentityTracker;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    database: Database,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, database: Database) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, database }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the storage backend.
    #[must_use]
    pub fn db(&self) -> &Database {
        &self.inner.database
    }

    /// Identity tracker for one request's session.
    #[must_use]
    pub fn identity<'a>(&'a self, session: &'a Session) -> IdentityTracker<'a> {
        IdentityTracker::new(self.db(), session, self.config().exclusive_login)
    }
}
