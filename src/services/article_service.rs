//! Domain service for article authoring, listing, favorites and tags.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::UserId;
use crate::services::presenter::ArticleDto;

/// Errors specific to article operations.
#[derive(Debug, Error)]
pub enum ArticleError {
    #[error("Article not found: {0}")]
    NotFound(String),

    #[error("Article already exists: {0}")]
    DuplicateTitle(String),

    #[error("Only the author may modify this article")]
    NotAuthor,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ArticleError {
    fn from(err: sea_orm::DbErr) -> Self {
        if matches!(
            err.sql_err(),
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
        ) {
            return Self::DuplicateTitle("title or slug already in use".to_string());
        }
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ArticleError {
    fn from(err: anyhow::Error) -> Self {
        if crate::db::is_unique_violation(&err) {
            return Self::DuplicateTitle("title or slug already in use".to_string());
        }
        Self::Internal(format!("{err:#}"))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticleInput {
    pub title: String,
    pub description: String,
    pub body: String,
    #[serde(default)]
    pub tag_list: Vec<String>,
}

/// Partial update; `tag_list`, when present, replaces the whole tag set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    pub tag_list: Option<Vec<String>>,
}

/// Query string of `GET /api/articles`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleListQuery {
    pub tag: Option<String>,
    pub author: Option<String>,
    pub favorited: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleList {
    pub articles: Vec<ArticleDto>,
    pub articles_count: u64,
}

/// Domain service trait for articles.
#[async_trait::async_trait]
pub trait ArticleService: Send + Sync {
    /// Lists articles newest first, filtered by tag, author and favoriting user.
    async fn list(
        &self,
        query: ArticleListQuery,
        viewer: Option<UserId>,
    ) -> Result<ArticleList, ArticleError>;

    /// Articles by authors the viewer follows, newest first.
    async fn feed(
        &self,
        viewer: UserId,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<ArticleList, ArticleError>;

    async fn get(&self, slug: &str, viewer: Option<UserId>) -> Result<ArticleDto, ArticleError>;

    /// # Errors
    ///
    /// Returns [`ArticleError::DuplicateTitle`] if the title or its slug is taken.
    async fn create(&self, author: UserId, input: NewArticleInput)
    -> Result<ArticleDto, ArticleError>;

    /// # Errors
    ///
    /// Returns [`ArticleError::NotAuthor`] unless `actor` wrote the article.
    async fn update(
        &self,
        actor: UserId,
        slug: &str,
        update: ArticleUpdate,
    ) -> Result<ArticleDto, ArticleError>;

    /// Deletes the article with its comments, favorites and tag links.
    async fn delete(&self, actor: UserId, slug: &str) -> Result<(), ArticleError>;

    async fn favorite(&self, actor: UserId, slug: &str) -> Result<ArticleDto, ArticleError>;

    async fn unfavorite(&self, actor: UserId, slug: &str) -> Result<ArticleDto, ArticleError>;

    /// Every tag name in use.
    async fn tags(&self) -> Result<Vec<String>, ArticleError>;
}
