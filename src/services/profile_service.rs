//! Domain service for public profiles and the follow graph.

use thiserror::Error;

use crate::domain::UserId;
use crate::services::presenter::ProfileDto;

/// Errors specific to profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Profile not found: {0}")]
    NotFound(String),

    #[error("Users cannot follow themselves")]
    SelfFollow,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ProfileError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ProfileError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// Domain service trait for profiles.
#[async_trait::async_trait]
pub trait ProfileService: Send + Sync {
    /// Gets a profile; `following` is relative to `viewer`.
    async fn get(&self, username: &str, viewer: Option<UserId>) -> Result<ProfileDto, ProfileError>;

    /// Follows `username` as `actor`. Following twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::SelfFollow`] when `username` is the actor.
    async fn follow(&self, actor: UserId, username: &str) -> Result<ProfileDto, ProfileError>;

    /// Unfollows `username`. Unfollowing someone not followed is a no-op.
    async fn unfollow(&self, actor: UserId, username: &str) -> Result<ProfileDto, ProfileError>;
}
