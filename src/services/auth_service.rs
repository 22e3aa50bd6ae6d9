//! Domain service for registration, sign-in and account management.
//!
//! Handles password verification, bearer token issuance, profile updates and
//! email confirmation.

use serde::Deserialize;
use thiserror::Error;

use crate::db::User;
use crate::domain::UserId;
use crate::services::presenter::UserDto;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User already registered: {0}")]
    DuplicateUser(String),

    #[error("Email address is not registered")]
    EmailNotRegistered,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        if matches!(
            err.sql_err(),
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
        ) {
            return Self::DuplicateUser("username or email already taken".to_string());
        }
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        if crate::db::is_unique_violation(&err) {
            return Self::DuplicateUser("username or email already taken".to_string());
        }
        Self::Internal(format!("{err:#}"))
    }
}

/// Registration input (already validated for shape).
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Fields a user may change about themselves. Absent fields stay untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub password: Option<String>,
}

/// Successful register/login: the payload plus the id to bind to the session.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user_id: UserId,
    pub user: UserDto,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates the account and, when mail is enabled, sends the confirmation
    /// token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateUser`] if the username or email is taken.
    async fn register(&self, registration: Registration) -> Result<SignedIn, AuthError>;

    /// Verifies credentials and issues a fresh bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailNotRegistered`] for an unknown email and
    /// [`AuthError::InvalidCredentials`] for a wrong password.
    async fn login(&self, email: &str, password: &str) -> Result<SignedIn, AuthError>;

    /// Resolves a bearer token to its user.
    async fn authenticate(&self, token: &str) -> Result<Option<User>, AuthError>;

    /// Resolves a session-bound user id.
    async fn find_user(&self, id: UserId) -> Result<Option<User>, AuthError>;

    async fn update(&self, id: UserId, update: UserUpdate) -> Result<UserDto, AuthError>;

    /// Confirms the email address if `token` matches.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] when the token does not match.
    async fn confirm(&self, id: UserId, token: &str) -> Result<UserDto, AuthError>;

    /// Removes the user and everything they own. Returns false if no such user.
    async fn delete_user(&self, username: &str) -> Result<bool, AuthError>;
}
