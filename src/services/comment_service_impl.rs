use async_trait::async_trait;
use tracing::debug;

use crate::db::{Article, Store};
use crate::domain::{CommentId, UserId};
use crate::services::comment_service::{CommentError, CommentService};
use crate::services::presenter::{CommentDto, Presenter};

pub struct SeaOrmCommentService {
    store: Store,
}

impl SeaOrmCommentService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn article(&self, slug: &str) -> Result<Article, CommentError> {
        self.store
            .get_article_by_slug(slug)
            .await?
            .ok_or_else(|| CommentError::ArticleNotFound(slug.to_string()))
    }
}

#[async_trait]
impl CommentService for SeaOrmCommentService {
    async fn add(&self, author: UserId, slug: &str, body: &str) -> Result<CommentDto, CommentError> {
        let article = self.article(slug).await?;

        let body = body.trim();
        if body.is_empty() {
            return Err(CommentError::Validation("body can't be empty".to_string()));
        }

        let comment = self
            .store
            .create_comment(article.id, author.value(), body)
            .await?;
        debug!(comment_id = comment.id, article_id = article.id, "Comment added");

        Ok(Presenter::new(&self.store, Some(author)).comment(comment).await?)
    }

    async fn list(&self, slug: &str, viewer: Option<UserId>) -> Result<Vec<CommentDto>, CommentError> {
        let article = self.article(slug).await?;
        let comments = self.store.list_comments(article.id).await?;
        Ok(Presenter::new(&self.store, viewer).comments(comments).await?)
    }

    async fn delete(&self, actor: UserId, slug: &str, id: CommentId) -> Result<(), CommentError> {
        let article = self.article(slug).await?;

        let comment = self
            .store
            .get_comment(id.value())
            .await?
            .filter(|c| c.article_id == article.id)
            .ok_or(CommentError::NotFound(id))?;

        if comment.author_id != actor.value() {
            return Err(CommentError::NotAuthor);
        }

        self.store.delete_comment(comment.id).await?;
        debug!(comment_id = comment.id, article_id = article.id, "Comment deleted");
        Ok(())
    }
}
