//! `SeaORM` implementation of the `ArticleService` trait.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::PaginationConfig;
use crate::db::{Article, ArticleChanges, ArticleFilter, NewArticle, Store};
use crate::domain::{Page, Slug, UserId, normalize_tags};
use crate::services::article_service::{
    ArticleError, ArticleList, ArticleListQuery, ArticleService, ArticleUpdate, NewArticleInput,
};
use crate::services::presenter::{ArticleDto, Presenter};

pub struct SeaOrmArticleService {
    store: Store,
    pagination: PaginationConfig,
}

impl SeaOrmArticleService {
    #[must_use]
    pub const fn new(store: Store, pagination: PaginationConfig) -> Self {
        Self { store, pagination }
    }

    fn page(&self, limit: Option<u64>, offset: Option<u64>) -> Page {
        Page::new(
            limit,
            offset,
            self.pagination.default_limit,
            self.pagination.max_limit,
        )
    }

    async fn find(&self, slug: &str) -> Result<Article, ArticleError> {
        self.store
            .get_article_by_slug(slug)
            .await?
            .ok_or_else(|| ArticleError::NotFound(slug.to_string()))
    }

    async fn owned(&self, actor: UserId, slug: &str) -> Result<Article, ArticleError> {
        let article = self.find(slug).await?;
        if article.author_id != actor.value() {
            return Err(ArticleError::NotAuthor);
        }
        Ok(article)
    }

    async fn present(&self, article: Article, viewer: Option<UserId>) -> Result<ArticleDto, ArticleError> {
        Ok(Presenter::new(&self.store, viewer).article(article).await?)
    }

    async fn present_list(
        &self,
        rows: Vec<Article>,
        total: u64,
        viewer: Option<UserId>,
    ) -> Result<ArticleList, ArticleError> {
        let articles = Presenter::new(&self.store, viewer).articles(rows).await?;
        Ok(ArticleList {
            articles,
            articles_count: total,
        })
    }
}

fn slug_for(title: &str) -> Result<Slug, ArticleError> {
    Slug::from_title(title)
        .ok_or_else(|| ArticleError::Validation("title must contain letters or digits".to_string()))
}

#[async_trait]
impl ArticleService for SeaOrmArticleService {
    async fn list(
        &self,
        query: ArticleListQuery,
        viewer: Option<UserId>,
    ) -> Result<ArticleList, ArticleError> {
        let page = self.page(query.limit, query.offset);
        let filter = ArticleFilter {
            tag: query.tag,
            author: query.author,
            favorited: query.favorited,
        };

        let (rows, total) = self.store.list_articles(&filter, page).await?;
        self.present_list(rows, total, viewer).await
    }

    async fn feed(
        &self,
        viewer: UserId,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<ArticleList, ArticleError> {
        let page = self.page(limit, offset);
        let (rows, total) = self.store.feed_articles(viewer.value(), page).await?;
        self.present_list(rows, total, Some(viewer)).await
    }

    async fn get(&self, slug: &str, viewer: Option<UserId>) -> Result<ArticleDto, ArticleError> {
        let article = self.find(slug).await?;
        self.present(article, viewer).await
    }

    async fn create(
        &self,
        author: UserId,
        input: NewArticleInput,
    ) -> Result<ArticleDto, ArticleError> {
        let title = input.title.trim();
        let slug = slug_for(title)?;

        if self.store.article_title_taken(title, slug.as_str(), None).await? {
            return Err(ArticleError::DuplicateTitle(title.to_string()));
        }

        let tags = normalize_tags(&input.tag_list);
        let article = self
            .store
            .create_article(NewArticle {
                author_id: author.value(),
                title,
                slug: slug.as_str(),
                description: &input.description,
                body: &input.body,
                tags: &tags,
            })
            .await?;

        info!(article_id = article.id, slug = %article.slug, author = %author, "Article created");
        self.present(article, Some(author)).await
    }

    async fn update(
        &self,
        actor: UserId,
        slug: &str,
        update: ArticleUpdate,
    ) -> Result<ArticleDto, ArticleError> {
        let article = self.owned(actor, slug).await?;

        let title_and_slug = match update.title.as_deref().map(str::trim) {
            Some(title) if title != article.title => {
                let new_slug = slug_for(title)?;
                if self
                    .store
                    .article_title_taken(title, new_slug.as_str(), Some(article.id))
                    .await?
                {
                    return Err(ArticleError::DuplicateTitle(title.to_string()));
                }
                Some((title.to_string(), new_slug.into_inner()))
            }
            _ => None,
        };

        let changes = ArticleChanges {
            title_and_slug,
            description: update.description,
            body: update.body,
            tags: update.tag_list.map(normalize_tags),
        };

        let updated = self.store.update_article(article.id, changes).await?;
        debug!(article_id = updated.id, slug = %updated.slug, "Article updated");

        self.present(updated, Some(actor)).await
    }

    async fn delete(&self, actor: UserId, slug: &str) -> Result<(), ArticleError> {
        let article = self.owned(actor, slug).await?;
        self.store.delete_article(article.id).await?;
        info!(article_id = article.id, slug = %slug, "Article deleted");
        Ok(())
    }

    async fn favorite(&self, actor: UserId, slug: &str) -> Result<ArticleDto, ArticleError> {
        let article = self.find(slug).await?;
        self.store.collect_article(actor.value(), article.id).await?;
        self.present(article, Some(actor)).await
    }

    async fn unfavorite(&self, actor: UserId, slug: &str) -> Result<ArticleDto, ArticleError> {
        let article = self.find(slug).await?;
        self.store.uncollect_article(actor.value(), article.id).await?;
        self.present(article, Some(actor)).await
    }

    async fn tags(&self) -> Result<Vec<String>, ArticleError> {
        Ok(self.store.list_tag_names().await?)
    }
}
