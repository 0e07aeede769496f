//! Session identity tracking.
//!
//! The logged-in user is an explicit session field holding a
//! [`CurrentUser`]. It is written once at login and removed once at logout;
//! the directory's `logged_in` flag mirrors it.

use tower_sessions::Session;

use tienda_core::Role;

use super::auth::{AuthError, AuthService};
use crate::db::{Database, RepositoryError};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{CurrentUser, User, session_keys};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub role: Role,
    /// Where the client should go next.
    pub landing_path: &'static str,
}

/// Tracks which directory user, if any, the current session belongs to.
pub struct IdentityTracker<'a> {
    db: &'a Database,
    session: &'a Session,
    exclusive: bool,
}

impl<'a> IdentityTracker<'a> {
    /// With `exclusive` set, a login logs every other user out.
    #[must_use]
    pub const fn new(db: &'a Database, session: &'a Session, exclusive: bool) -> Self {
        Self {
            db,
            session,
            exclusive,
        }
    }

    /// The identity stored in the session, without consulting the directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn current(&self) -> Result<Option<CurrentUser>, tower_sessions::session::Error> {
        self.session.get(session_keys::CURRENT_USER).await
    }

    /// Re-read the tracked user from the directory.
    ///
    /// A tracked user that was deleted or logged out elsewhere is dropped
    /// from the session and reported as no user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` or `AuthError::Repository` on store
    /// failures.
    pub async fn refresh(&self) -> Result<Option<User>, AuthError> {
        let Some(current) = self.current().await? else {
            return Ok(None);
        };

        match self.db.users().get(current.id).await? {
            Some(user) if user.logged_in => Ok(Some(user)),
            _ => {
                tracing::debug!(user_id = %current.id, "Dropping stale session identity");
                self.forget().await?;
                Ok(None)
            }
        }
    }

    /// Check credentials and make the user the session's identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username is unknown or
    /// the password is wrong; nothing is changed in that case.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let mut user = AuthService::new(self.db)
            .authenticate(username, password)
            .await?;
        let users = self.db.users();

        if let Some(previous) = self.current().await?
            && previous.id != user.id
        {
            release(self.db, &previous).await?;
        }
        if self.exclusive {
            let cleared = users.clear_logged_in_except(user.id).await?;
            if cleared > 0 {
                tracing::info!(cleared, "Logged out other users");
            }
        }
        users.set_logged_in(user.id, true).await?;
        user.logged_in = true;

        self.session.cycle_id().await?;
        self.session
            .insert(session_keys::CURRENT_USER, CurrentUser::from(&user))
            .await?;
        set_sentry_user(&user.id, Some(user.email.as_str()));

        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
        Ok(LoginOutcome {
            role: user.role,
            landing_path: user.role.landing_path(),
            user,
        })
    }

    /// Log the tracked user out. Returns `false` if nobody was logged in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` or `AuthError::Repository` on store
    /// failures.
    pub async fn logout(&self) -> Result<bool, AuthError> {
        let Some(current) = self.current().await? else {
            return Ok(false);
        };

        release(self.db, &current).await?;
        self.forget().await?;

        tracing::info!(user_id = %current.id, "User logged out");
        Ok(true)
    }

    async fn forget(&self) -> Result<(), tower_sessions::session::Error> {
        self.session
            .remove::<CurrentUser>(session_keys::CURRENT_USER)
            .await?;
        clear_sentry_user();
        Ok(())
    }
}

/// Clear the directory flag; a user deleted meanwhile has nothing to clear.
async fn release(db: &Database, user: &CurrentUser) -> Result<(), AuthError> {
    match db.users().set_logged_in(user.id, false).await {
        Ok(()) | Err(RepositoryError::NotFound) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
