//! Domain service for comments on articles.

use thiserror::Error;

use crate::domain::{CommentId, UserId};
use crate::services::presenter::CommentDto;

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("Article not found: {0}")]
    ArticleNotFound(String),

    /// Missing, or attached to a different article.
    #[error("Comment not found: {0}")]
    NotFound(CommentId),

    #[error("Only the author may delete this comment")]
    NotAuthor,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for CommentError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for CommentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

#[async_trait::async_trait]
pub trait CommentService: Send + Sync {
    /// # Errors
    ///
    /// Returns [`CommentError::Validation`] for a blank body.
    async fn add(&self, author: UserId, slug: &str, body: &str) -> Result<CommentDto, CommentError>;

    /// Comments of the article, oldest first.
    async fn list(&self, slug: &str, viewer: Option<UserId>) -> Result<Vec<CommentDto>, CommentError>;

    /// # Errors
    ///
    /// Returns [`CommentError::NotFound`] if the comment is not on this article
    /// and [`CommentError::NotAuthor`] if `actor` did not write it.
    async fn delete(&self, actor: UserId, slug: &str, id: CommentId) -> Result<(), CommentError>;
}
