use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, Select, Set, TransactionTrait,
};

use super::{tag, user::delete_article_children};
use crate::domain::Page;
use crate::entities::{article_tags, articles, collects, follows, prelude::*, tags, users};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: i32,
    pub author_id: i32,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<articles::Model> for Article {
    fn from(model: articles::Model) -> Self {
        Self {
            id: model.id,
            author_id: model.author_id,
            title: model.title,
            slug: model.slug,
            description: model.description,
            body: model.body,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct NewArticle<'a> {
    pub author_id: i32,
    pub title: &'a str,
    pub slug: &'a str,
    pub description: &'a str,
    pub body: &'a str,
    pub tags: &'a [String],
}

/// Partial article update. A new title must come with its slug.
#[derive(Debug, Default)]
pub struct ArticleChanges {
    pub title_and_slug: Option<(String, String)>,
    pub description: Option<String>,
    pub body: Option<String>,
    /// Replaces the whole tag set when present.
    pub tags: Option<Vec<String>>,
}

/// Optional list filters, combined with AND.
#[derive(Debug, Default, Clone)]
pub struct ArticleFilter {
    pub tag: Option<String>,
    pub author: Option<String>,
    pub favorited: Option<String>,
}

pub struct ArticleRepository {
    conn: DatabaseConnection,
}

impl ArticleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<Article>> {
        let article = Articles::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query article by ID")?;

        Ok(article.map(Article::from))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        let article = Articles::find()
            .filter(articles::Column::Slug.eq(slug))
            .one(&self.conn)
            .await
            .context("Failed to query article by slug")?;

        Ok(article.map(Article::from))
    }

    /// Whether another article already uses this title or slug.
    pub async fn title_taken(&self, title: &str, slug: &str, except: Option<i32>) -> Result<bool> {
        let mut query = Articles::find().filter(
            Condition::any()
                .add(articles::Column::Title.eq(title))
                .add(articles::Column::Slug.eq(slug)),
        );

        if let Some(id) = except {
            query = query.filter(articles::Column::Id.ne(id));
        }

        Ok(query.count(&self.conn).await? > 0)
    }

    /// Inserts the article and its tag links in one transaction.
    pub async fn create(&self, new_article: NewArticle<'_>) -> Result<Article> {
        let txn = self.conn.begin().await?;

        let now = crate::domain::timestamp();
        let model = articles::ActiveModel {
            author_id: Set(new_article.author_id),
            title: Set(new_article.title.to_string()),
            slug: Set(new_article.slug.to_string()),
            description: Set(new_article.description.to_string()),
            body: Set(new_article.body.to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert article")?;

        let tag_ids = tag::resolve_ids(&txn, new_article.tags).await?;
        tag::set_article_tags(&txn, model.id, &tag_ids).await?;

        txn.commit().await?;
        Ok(Article::from(model))
    }

    pub async fn update(&self, id: i32, changes: ArticleChanges) -> Result<Article> {
        let txn = self.conn.begin().await?;

        let existing = Articles::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Article not found: {id}"))?;

        let mut active: articles::ActiveModel = existing.into();
        if let Some((title, slug)) = changes.title_and_slug {
            active.title = Set(title);
            active.slug = Set(slug);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(body) = changes.body {
            active.body = Set(body);
        }
        active.updated_at = Set(crate::domain::timestamp());

        let model = active.update(&txn).await.context("Failed to update article")?;

        if let Some(names) = changes.tags {
            let tag_ids = tag::resolve_ids(&txn, &names).await?;
            tag::set_article_tags(&txn, id, &tag_ids).await?;
        }

        txn.commit().await?;
        Ok(Article::from(model))
    }

    /// Deletes the article with its comments, favorites and tag links.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        delete_article_children(&txn, &[id]).await?;
        let result = Articles::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    /// One page of articles matching `filter`, newest first, plus the total
    /// number of matches.
    pub async fn list(&self, filter: &ArticleFilter, page: Page) -> Result<(Vec<Article>, u64)> {
        let Some(query) = self.filtered(filter).await? else {
            return Ok((Vec::new(), 0));
        };

        self.paginate(query, page).await
    }

    /// Articles written by anyone `follower_id` follows.
    pub async fn feed(&self, follower_id: i32, page: Page) -> Result<(Vec<Article>, u64)> {
        let followed = Follows::find()
            .select_only()
            .column(follows::Column::FollowedId)
            .filter(follows::Column::FollowerId.eq(follower_id))
            .into_query();

        let query = Articles::find().filter(articles::Column::AuthorId.in_subquery(followed));
        self.paginate(query, page).await
    }

    async fn paginate(&self, query: Select<Articles>, page: Page) -> Result<(Vec<Article>, u64)> {
        let total = query.clone().count(&self.conn).await?;

        let rows = query
            .order_by_desc(articles::Column::CreatedAt)
            .order_by_desc(articles::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.conn)
            .await
            .context("Failed to list articles")?;

        Ok((rows.into_iter().map(Article::from).collect(), total))
    }

    /// Builds the filtered query. `None` means a filter names a tag or user
    /// that does not exist, so nothing can match.
    async fn filtered(&self, filter: &ArticleFilter) -> Result<Option<Select<Articles>>> {
        let mut query = Articles::find();

        if let Some(name) = &filter.tag {
            let Some(tag) = Tags::find()
                .filter(tags::Column::Name.eq(name.as_str()))
                .one(&self.conn)
                .await?
            else {
                return Ok(None);
            };

            let tagged = ArticleTags::find()
                .select_only()
                .column(article_tags::Column::ArticleId)
                .filter(article_tags::Column::TagId.eq(tag.id))
                .into_query();
            query = query.filter(articles::Column::Id.in_subquery(tagged));
        }

        if let Some(username) = &filter.author {
            let Some(author) = self.user_id_by_name(username).await? else {
                return Ok(None);
            };
            query = query.filter(articles::Column::AuthorId.eq(author));
        }

        if let Some(username) = &filter.favorited {
            let Some(collector) = self.user_id_by_name(username).await? else {
                return Ok(None);
            };

            let favorited = Collects::find()
                .select_only()
                .column(collects::Column::CollectedId)
                .filter(collects::Column::CollectorId.eq(collector))
                .into_query();
            query = query.filter(articles::Column::Id.in_subquery(favorited));
        }

        Ok(Some(query))
    }

    async fn user_id_by_name(&self, username: &str) -> Result<Option<i32>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await?;

        Ok(user.map(|u| u.id))
    }
}
