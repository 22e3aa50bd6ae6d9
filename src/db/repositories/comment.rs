use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{comments, prelude::*};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: i32,
    pub body: String,
    pub article_id: i32,
    pub author_id: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<comments::Model> for Comment {
    fn from(model: comments::Model) -> Self {
        Self {
            id: model.id,
            body: model.body,
            article_id: model.article_id,
            author_id: model.author_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct CommentRepository {
    conn: DatabaseConnection,
}

impl CommentRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, article_id: i32, author_id: i32, body: &str) -> Result<Comment> {
        let now = crate::domain::timestamp();
        let model = comments::ActiveModel {
            body: Set(body.to_string()),
            article_id: Set(article_id),
            author_id: Set(author_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert comment")?;

        Ok(Comment::from(model))
    }

    pub async fn get(&self, id: i32) -> Result<Option<Comment>> {
        let comment = Comments::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query comment")?;

        Ok(comment.map(Comment::from))
    }

    /// Comments on an article, oldest first.
    pub async fn list_for_article(&self, article_id: i32) -> Result<Vec<Comment>> {
        let rows = Comments::find()
            .filter(comments::Column::ArticleId.eq(article_id))
            .order_by_asc(comments::Column::CreatedAt)
            .order_by_asc(comments::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list comments")?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Comments::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
