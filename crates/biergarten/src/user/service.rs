//! User service for business logic.

use anyhow::Context;
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::models::{LoginRequest, NewUser, RegisterRequest, User};
use super::repository::{CreateUserError, UserRepository};
use crate::validation::{Validate, ValidationErrors};

/// Why a user operation failed.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Username '{0}' is already taken.")]
    UsernameTaken(String),

    #[error("Email '{0}' is already registered.")]
    EmailTaken(String),

    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("Account is already confirmed")]
    AlreadyConfirmed,

    #[error("Invalid link")]
    InvalidLink,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Service for user account operations.
#[derive(Debug, Clone)]
pub struct UserService {
    repo: UserRepository,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(repo: UserRepository, bcrypt_cost: u32) -> Self {
        Self { repo, bcrypt_cost }
    }

    /// Validate and store a new account.
    #[instrument(skip(self, request))]
    pub async fn register(&self, request: RegisterRequest) -> Result<User, UserError> {
        request.validate()?;

        // Validation guarantees all three are present.
        let (Some(username), Some(email), Some(password)) =
            (request.username, request.email, request.password)
        else {
            return Err(UserError::Internal(anyhow::anyhow!(
                "validated registration is missing a field"
            )));
        };
        let username = username.trim().to_string();
        let email = email.trim().to_string();

        if !self.repo.is_username_available(&username).await? {
            return Err(UserError::UsernameTaken(username));
        }
        if !self.repo.is_email_available(&email).await? {
            return Err(UserError::EmailTaken(email));
        }

        let password_hash = hash_password(password, self.bcrypt_cost).await?;
        // A concurrent registration can still win between the checks and the insert.
        let user = self
            .repo
            .create(NewUser {
                username: username.clone(),
                email: email.clone(),
                password_hash,
            })
            .await
            .map_err(|err| match err {
                CreateUserError::UsernameTaken => UserError::UsernameTaken(username),
                CreateUserError::EmailTaken => UserError::EmailTaken(email),
                CreateUserError::Other(err) => UserError::Internal(err),
            })?;
        info!(user_id = %user.id, username = %user.username, "Registered new user");

        Ok(user)
    }

    /// Check a username (or email) and password pair.
    #[instrument(skip(self, request))]
    pub async fn authenticate(&self, request: LoginRequest) -> Result<User, UserError> {
        request.validate()?;

        let (Some(login), Some(password)) = (request.username, request.password) else {
            return Err(UserError::InvalidCredentials);
        };

        let Some(user) = self.repo.get_by_login(login.trim()).await? else {
            return Err(UserError::InvalidCredentials);
        };

        if !verify_password(password, user.password_hash.clone()).await? {
            warn!(user_id = %user.id, "Failed login attempt");
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, UserError> {
        Ok(self.repo.get(id).await?)
    }

    /// Confirm `user_id`, given the subject of a verified confirmation token.
    #[instrument(skip(self))]
    pub async fn confirm(&self, user_id: &str, token_subject: &str) -> Result<User, UserError> {
        let user = self.repo.get(user_id).await?.ok_or(UserError::InvalidLink)?;

        if user.is_account_confirmed {
            return Err(UserError::AlreadyConfirmed);
        }
        if user.id != token_subject {
            warn!(user_id, token_subject, "Confirmation token issued for another user");
            return Err(UserError::InvalidLink);
        }

        let user = self.repo.set_confirmed(&user.id).await?;
        info!(user_id = %user.id, "Confirmed account");

        Ok(user)
    }
}

/// Hash a password using bcrypt on the blocking pool.
async fn hash_password(password: String, cost: u32) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("Password hashing task failed")?
        .context("Failed to hash password")
}

/// Verify a password against a bcrypt hash on the blocking pool.
async fn verify_password(password: String, hash: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .context("Password verification task failed")?
        .context("Failed to verify password")
}
