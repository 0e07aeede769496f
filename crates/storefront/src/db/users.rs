//! User repository for database operations.
//!
//! The directory owns the `loggedIn` flag and the password hash. Hashes are
//! only handed out through [`UserRepository::get_credentials`].

use chrono::{DateTime, NaiveDate, Utc};

use tienda_core::{Email, Role, UserId};

use super::memory::StoredUser;
use super::{Database, RepositoryError, map_constraint_error};
use crate::models::{NewUser, User, UserChanges};

const USERNAME_TAKEN: &str = "username already exists";

const USER_COLUMNS: &str = "id, full_name, username, email, shipping_address, password_hash, \
                            birth_date, logged_in, role, created_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    full_name: String,
    username: String,
    email: String,
    shipping_address: String,
    password_hash: String,
    birth_date: NaiveDate,
    logged_in: bool,
    role: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_stored(self) -> Result<StoredUser, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = self
            .role
            .parse::<Role>()
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid role in database: {e}")))?;

        Ok(StoredUser {
            user: User {
                id: UserId::new(self.id),
                full_name: self.full_name,
                username: self.username,
                email,
                shipping_address: self.shipping_address,
                birth_date: self.birth_date,
                logged_in: self.logged_in,
                role,
                created_at: self.created_at,
            },
            password_hash: self.password_hash,
        })
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        self.into_stored().map(|stored| stored.user)
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// List every user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        match self.db {
            Database::Postgres(pool) => {
                let rows = sqlx::query_as::<_, UserRow>(&format!(
                    "SELECT {USER_COLUMNS} FROM tienda.user ORDER BY id"
                ))
                .fetch_all(pool)
                .await?;
                rows.into_iter().map(UserRow::into_user).collect()
            }
            Database::Memory(mem) => Ok(mem
                .read()
                .await
                .users
                .values()
                .map(|stored| stored.user.clone())
                .collect()),
        }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        match self.db {
            Database::Postgres(pool) => {
                let row = sqlx::query_as::<_, UserRow>(&format!(
                    "SELECT {USER_COLUMNS} FROM tienda.user WHERE id = $1"
                ))
                .bind(id.as_i32())
                .fetch_optional(pool)
                .await?;
                row.map(UserRow::into_user).transpose()
            }
            Database::Memory(mem) => Ok(mem
                .read()
                .await
                .users
                .get(&id)
                .map(|stored| stored.user.clone())),
        }
    }

    /// Get a user by login name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .get_credentials(username)
            .await?
            .map(|(user, _)| user))
    }

    /// Get a user and their password hash by login name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_credentials(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let stored = match self.db {
            Database::Postgres(pool) => sqlx::query_as::<_, UserRow>(&format!(
                "SELECT {USER_COLUMNS} FROM tienda.user WHERE username = $1"
            ))
            .bind(username)
            .fetch_optional(pool)
            .await?
            .map(UserRow::into_stored)
            .transpose()?,
            Database::Memory(mem) => mem
                .read()
                .await
                .users
                .values()
                .find(|stored| stored.user.username == username)
                .cloned(),
        };

        Ok(stored.map(|s| (s.user, s.password_hash)))
    }

    /// Create a new user. New users start logged out.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new: &NewUser) -> Result<User, RepositoryError> {
        match self.db {
            Database::Postgres(pool) => {
                let row = sqlx::query_as::<_, UserRow>(&format!(
                    r"
                    INSERT INTO tienda.user
                        (full_name, username, email, shipping_address, password_hash, birth_date, role)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    RETURNING {USER_COLUMNS}
                    "
                ))
                .bind(&new.full_name)
                .bind(&new.username)
                .bind(new.email.as_str())
                .bind(&new.shipping_address)
                .bind(&new.password_hash)
                .bind(new.birth_date)
                .bind(new.role.as_str())
                .fetch_one(pool)
                .await
                .map_err(|e| map_constraint_error(e, USERNAME_TAKEN))?;
                row.into_user()
            }
            Database::Memory(mem) => {
                let mut tables = mem.write().await;
                if tables.username_taken(&new.username, None) {
                    return Err(RepositoryError::Conflict(USERNAME_TAKEN.to_owned()));
                }

                let user = User {
                    id: tables.next_user_id(),
                    full_name: new.full_name.clone(),
                    username: new.username.clone(),
                    email: new.email.clone(),
                    shipping_address: new.shipping_address.clone(),
                    birth_date: new.birth_date,
                    logged_in: false,
                    role: new.role,
                    created_at: Utc::now(),
                };
                tables.users.insert(
                    user.id,
                    StoredUser {
                        user: user.clone(),
                        password_hash: new.password_hash.clone(),
                    },
                );
                Ok(user)
            }
        }
    }

    /// Apply changes to a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new username is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: UserId, changes: &UserChanges) -> Result<User, RepositoryError> {
        match self.db {
            Database::Postgres(pool) => {
                let row = sqlx::query_as::<_, UserRow>(&format!(
                    r"
                    UPDATE tienda.user
                    SET full_name = $2,
                        username = COALESCE($3, username),
                        email = $4,
                        shipping_address = $5,
                        birth_date = $6,
                        role = COALESCE($7, role),
                        password_hash = COALESCE($8, password_hash),
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING {USER_COLUMNS}
                    "
                ))
                .bind(id.as_i32())
                .bind(&changes.full_name)
                .bind(changes.username.as_deref())
                .bind(changes.email.as_str())
                .bind(&changes.shipping_address)
                .bind(changes.birth_date)
                .bind(changes.role.map(Role::as_str))
                .bind(changes.password_hash.as_deref())
                .fetch_optional(pool)
                .await
                .map_err(|e| map_constraint_error(e, USERNAME_TAKEN))?;
                row.ok_or(RepositoryError::NotFound)?.into_user()
            }
            Database::Memory(mem) => {
                let mut tables = mem.write().await;
                if let Some(username) = &changes.username
                    && tables.username_taken(username, Some(id))
                {
                    return Err(RepositoryError::Conflict(USERNAME_TAKEN.to_owned()));
                }

                let stored = tables.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
                stored.user.full_name.clone_from(&changes.full_name);
                if let Some(username) = &changes.username {
                    stored.user.username.clone_from(username);
                }
                stored.user.email = changes.email.clone();
                stored.user.shipping_address.clone_from(&changes.shipping_address);
                stored.user.birth_date = changes.birth_date;
                if let Some(role) = changes.role {
                    stored.user.role = role;
                }
                if let Some(hash) = &changes.password_hash {
                    stored.password_hash.clone_from(hash);
                }
                Ok(stored.user.clone())
            }
        }
    }

    /// Set or clear a user's logged-in flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_logged_in(&self, id: UserId, logged_in: bool) -> Result<(), RepositoryError> {
        match self.db {
            Database::Postgres(pool) => {
                let result = sqlx::query(
                    "UPDATE tienda.user SET logged_in = $2, updated_at = NOW() WHERE id = $1",
                )
                .bind(id.as_i32())
                .bind(logged_in)
                .execute(pool)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(RepositoryError::NotFound);
                }
                Ok(())
            }
            Database::Memory(mem) => {
                let mut tables = mem.write().await;
                let stored = tables.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
                stored.user.logged_in = logged_in;
                Ok(())
            }
        }
    }

    /// Clear the logged-in flag on every user except `keep`.
    ///
    /// Returns how many users were logged out.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_logged_in_except(&self, keep: UserId) -> Result<u64, RepositoryError> {
        match self.db {
            Database::Postgres(pool) => {
                let result = sqlx::query(
                    r"
                    UPDATE tienda.user
                    SET logged_in = FALSE, updated_at = NOW()
                    WHERE logged_in AND id <> $1
                    ",
                )
                .bind(keep.as_i32())
                .execute(pool)
                .await?;
                Ok(result.rows_affected())
            }
            Database::Memory(mem) => {
                let mut tables = mem.write().await;
                let mut cleared = 0;
                for stored in tables.users.values_mut() {
                    if stored.user.logged_in && stored.user.id != keep {
                        stored.user.logged_in = false;
                        cleared += 1;
                    }
                }
                Ok(cleared)
            }
        }
    }

    /// Delete a user and their purchases.
    ///
    /// # Returns
    ///
    /// Returns `true` if the user was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        match self.db {
            Database::Postgres(pool) => {
                let result = sqlx::query("DELETE FROM tienda.user WHERE id = $1")
                    .bind(id.as_i32())
                    .execute(pool)
                    .await?;
                Ok(result.rows_affected() > 0)
            }
            Database::Memory(mem) => {
                let mut tables = mem.write().await;
                let removed = tables.users.remove(&id).is_some();
                if removed {
                    tables.purchases.retain(|_, receipt| receipt.user_id != id);
                }
                Ok(removed)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            full_name: "Juan Pérez".into(),
            username: username.into(),
            email: Email::parse("juan@example.cl").unwrap(),
            shipping_address: String::new(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            role: Role::User,
            password_hash: "hash".into(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_ids_and_rejects_duplicates() {
        let db = Database::memory();
        let users = db.users();

        let first = users.create(&new_user("jperez")).await.unwrap();
        let second = users.create(&new_user("mrojas")).await.unwrap();
        assert_ne!(first.id, second.id);
        assert!(!first.logged_in);

        let err = users.create(&new_user("jperez")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_absent_leaves_directory_unchanged() {
        let db = Database::memory();
        let users = db.users();
        users.create(&new_user("jperez")).await.unwrap();
        let before = users.list().await.unwrap();

        assert!(!users.delete(UserId::new(99)).await.unwrap());
        assert_eq!(users.list().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_clear_logged_in_except() {
        let db = Database::memory();
        let users = db.users();
        let a = users.create(&new_user("a")).await.unwrap();
        let b = users.create(&new_user("b")).await.unwrap();
        users.set_logged_in(a.id, true).await.unwrap();
        users.set_logged_in(b.id, true).await.unwrap();

        assert_eq!(users.clear_logged_in_except(b.id).await.unwrap(), 1);
        let flagged: Vec<_> = users
            .list()
            .await
            .unwrap()
            .into_iter()
            .filter(|u| u.logged_in)
            .collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].id, b.id);
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let db = Database::memory();
        let changes = UserChanges {
            full_name: "Nadie".into(),
            username: None,
            email: Email::parse("nadie@example.cl").unwrap(),
            shipping_address: String::new(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            role: None,
            password_hash: None,
        };
        let err = db.users().update(UserId::new(5), &changes).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_credentials_lookup() {
        let db = Database::memory();
        db.users().create(&new_user("jperez")).await.unwrap();

        let (user, hash) = db.users().get_credentials("jperez").await.unwrap().unwrap();
        assert_eq!(user.username, "jperez");
        assert_eq!(hash, "hash");
        assert!(db.users().get_by_username("nadie").await.unwrap().is_none());
    }
}
