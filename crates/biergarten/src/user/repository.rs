//! User repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, instrument};

use super::models::{NewUser, User};
use crate::ids;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, is_account_confirmed, created_at, updated_at";

/// Why an insert into `users` failed.
#[derive(Debug, Error)]
pub enum CreateUserError {
    #[error("username already exists")]
    UsernameTaken,

    #[error("email already exists")]
    EmailTaken,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Map a UNIQUE violation on `users` to the column that caused it.
fn classify_insert_error(err: sqlx::Error) -> CreateUserError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_unique_violation()
    {
        if db_err.message().contains("users.username") {
            return CreateUserError::UsernameTaken;
        }
        if db_err.message().contains("users.email") {
            return CreateUserError::EmailTaken;
        }
    }
    CreateUserError::Other(anyhow::Error::new(err).context("Failed to insert user"))
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new, unconfirmed user.
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn create(&self, user: NewUser) -> Result<User, CreateUserError> {
        let id = ids::generate(ids::USER_PREFIX);
        let now = chrono::Utc::now().to_rfc3339();

        debug!("Creating user: {} ({})", user.username, id);

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, is_account_confirmed, created_at, updated_at)
            VALUES (?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(classify_insert_error)?;

        let user = self
            .get(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found after creation"))?;
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user")?;

        Ok(user)
    }

    /// Look a user up by username or email, both case-insensitive.
    #[instrument(skip(self))]
    pub async fn get_by_login(&self, login: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?1 OR email = ?1"
        ))
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by login")?;

        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn is_username_available(&self, username: &str) -> Result<bool> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check username availability")?;

        Ok(count.0 == 0)
    }

    #[instrument(skip(self))]
    pub async fn is_email_available(&self, email: &str) -> Result<bool> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check email availability")?;

        Ok(count.0 == 0)
    }

    /// Mark the account as confirmed.
    #[instrument(skip(self))]
    pub async fn set_confirmed(&self, id: &str) -> Result<User> {
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query("UPDATE users SET is_account_confirmed = 1, updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to confirm user")?;

        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found after confirmation"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$2b$04$not-a-real-hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool().clone());

        let user = repo.create(new_user("Hophead", "hop@example.com")).await.unwrap();
        assert!(user.id.starts_with("usr_"));
        assert!(!user.is_account_confirmed);

        let by_name = repo.get_by_login("hophead").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        let by_email = repo.get_by_login("HOP@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert!(repo.get_by_login("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_availability_checks() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool().clone());
        repo.create(new_user("hophead", "hop@example.com")).await.unwrap();

        assert!(!repo.is_username_available("HOPHEAD").await.unwrap());
        assert!(!repo.is_email_available("hop@example.com").await.unwrap());
        assert!(repo.is_username_available("maltster").await.unwrap());
    }

    #[tokio::test]
    async fn test_unique_violations_are_classified() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool().clone());
        repo.create(new_user("hophead", "hop@example.com")).await.unwrap();

        assert!(matches!(
            repo.create(new_user("HopHead", "other@example.com")).await,
            Err(CreateUserError::UsernameTaken)
        ));
        assert!(matches!(
            repo.create(new_user("maltster", "HOP@example.com")).await,
            Err(CreateUserError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn test_set_confirmed() {
        let db = Database::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool().clone());
        let user = repo.create(new_user("hophead", "hop@example.com")).await.unwrap();

        let confirmed = repo.set_confirmed(&user.id).await.unwrap();
        assert!(confirmed.is_account_confirmed);
    }
}
