use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::domain::Page;

pub mod migrator;
pub mod repositories;

pub use repositories::article::{Article, ArticleChanges, ArticleFilter, NewArticle};
pub use repositories::comment::Comment;
pub use repositories::user::{NewUser, User, UserChanges};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

/// `sqlite::memory:` and `file:..?mode=memory` databases live inside a single
/// connection, so the pool must never open a second one.
fn is_memory_url(db_url: &str) -> bool {
    db_url.contains(":memory:") || db_url.contains("mode=memory")
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = is_memory_url(db_url);

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        if !in_memory {
            opt.idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn article_repo(&self) -> repositories::article::ArticleRepository {
        repositories::article::ArticleRepository::new(self.conn.clone())
    }

    fn tag_repo(&self) -> repositories::tag::TagRepository {
        repositories::tag::TagRepository::new(self.conn.clone())
    }

    fn comment_repo(&self) -> repositories::comment::CommentRepository {
        repositories::comment::CommentRepository::new(self.conn.clone())
    }

    fn follow_repo(&self) -> repositories::follow::FollowRepository {
        repositories::follow::FollowRepository::new(self.conn.clone())
    }

    fn collect_repo(&self) -> repositories::collect::CollectRepository {
        repositories::collect::CollectRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn create_user(&self, new_user: NewUser<'_>, config: &SecurityConfig) -> Result<User> {
        self.user_repo().create(new_user, config).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_users_by_ids(&self, ids: &[i32]) -> Result<Vec<User>> {
        self.user_repo().get_by_ids(ids).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_token(&self, token: &str) -> Result<Option<User>> {
        self.user_repo().get_by_token(token).await
    }

    pub async fn verify_user_password(&self, id: i32, password: &str) -> Result<bool> {
        self.user_repo().verify_password(id, password).await
    }

    pub async fn update_user(
        &self,
        id: i32,
        changes: UserChanges,
        config: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo().update(id, changes, config).await
    }

    pub async fn rotate_user_token(&self, id: i32) -> Result<String> {
        self.user_repo().rotate_token(id).await
    }

    pub async fn get_user_confirm_token(&self, id: i32) -> Result<Option<String>> {
        self.user_repo().get_confirm_token(id).await
    }

    pub async fn confirm_user(&self, id: i32, token: &str) -> Result<bool> {
        self.user_repo().confirm(id, token).await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    // ========== Follows ==========

    pub async fn follow(&self, follower_id: i32, followed_id: i32) -> Result<()> {
        self.follow_repo().follow(follower_id, followed_id).await
    }

    pub async fn unfollow(&self, follower_id: i32, followed_id: i32) -> Result<()> {
        self.follow_repo().unfollow(follower_id, followed_id).await
    }

    pub async fn is_following(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        self.follow_repo().is_following(follower_id, followed_id).await
    }

    /// Whether `other` follows `user_id`.
    pub async fn is_followed_by(&self, user_id: i32, other: i32) -> Result<bool> {
        self.follow_repo().is_following(other, user_id).await
    }

    pub async fn following_among(&self, follower_id: i32, candidates: &[i32]) -> Result<HashSet<i32>> {
        self.follow_repo().following_among(follower_id, candidates).await
    }

    // ========== Articles ==========

    pub async fn create_article(&self, new_article: NewArticle<'_>) -> Result<Article> {
        self.article_repo().create(new_article).await
    }

    pub async fn get_article(&self, id: i32) -> Result<Option<Article>> {
        self.article_repo().get_by_id(id).await
    }

    pub async fn get_article_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        self.article_repo().get_by_slug(slug).await
    }

    pub async fn article_title_taken(
        &self,
        title: &str,
        slug: &str,
        except: Option<i32>,
    ) -> Result<bool> {
        self.article_repo().title_taken(title, slug, except).await
    }

    pub async fn update_article(&self, id: i32, changes: ArticleChanges) -> Result<Article> {
        self.article_repo().update(id, changes).await
    }

    pub async fn delete_article(&self, id: i32) -> Result<bool> {
        self.article_repo().delete(id).await
    }

    pub async fn list_articles(
        &self,
        filter: &ArticleFilter,
        page: Page,
    ) -> Result<(Vec<Article>, u64)> {
        self.article_repo().list(filter, page).await
    }

    pub async fn feed_articles(&self, follower_id: i32, page: Page) -> Result<(Vec<Article>, u64)> {
        self.article_repo().feed(follower_id, page).await
    }

    // ========== Tags ==========

    pub async fn list_tag_names(&self) -> Result<Vec<String>> {
        self.tag_repo().list_names().await
    }

    pub async fn tags_for_articles(&self, article_ids: &[i32]) -> Result<HashMap<i32, Vec<String>>> {
        self.tag_repo().names_for_articles(article_ids).await
    }

    // ========== Favorites ==========

    pub async fn collect_article(&self, user_id: i32, article_id: i32) -> Result<()> {
        self.collect_repo().collect(user_id, article_id).await
    }

    pub async fn uncollect_article(&self, user_id: i32, article_id: i32) -> Result<()> {
        self.collect_repo().uncollect(user_id, article_id).await
    }

    pub async fn is_collecting(&self, user_id: i32, article_id: i32) -> Result<bool> {
        Ok(self
            .collect_repo()
            .collected_among(user_id, &[article_id])
            .await?
            .contains(&article_id))
    }

    pub async fn favorite_counts(&self, article_ids: &[i32]) -> Result<HashMap<i32, i64>> {
        self.collect_repo().counts_for(article_ids).await
    }

    pub async fn collected_among(&self, user_id: i32, article_ids: &[i32]) -> Result<HashSet<i32>> {
        self.collect_repo().collected_among(user_id, article_ids).await
    }

    // ========== Comments ==========

    pub async fn create_comment(&self, article_id: i32, author_id: i32, body: &str) -> Result<Comment> {
        self.comment_repo().create(article_id, author_id, body).await
    }

    pub async fn get_comment(&self, id: i32) -> Result<Option<Comment>> {
        self.comment_repo().get(id).await
    }

    pub async fn list_comments(&self, article_id: i32) -> Result<Vec<Comment>> {
        self.comment_repo().list_for_article(article_id).await
    }

    pub async fn delete_comment(&self, id: i32) -> Result<bool> {
        self.comment_repo().delete(id).await
    }
}

/// Whether the error (anywhere in its chain) is a UNIQUE constraint failure.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<DbErr>()
            .and_then(DbErr::sql_err)
            .is_some_and(|e| matches!(e, SqlErr::UniqueConstraintViolation(_)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_security() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        }
    }

    async fn store() -> Store {
        Store::new("sqlite::memory:").await.unwrap()
    }

    async fn user(store: &Store, name: &str) -> User {
        let email = format!("{name}@Example.com");
        store
            .create_user(
                NewUser {
                    username: name,
                    email: &email,
                    password: "password123",
                },
                &fast_security(),
            )
            .await
            .unwrap()
    }

    async fn article(store: &Store, author: i32, title: &str, tags: &[&str]) -> Article {
        let tags: Vec<String> = tags.iter().map(ToString::to_string).collect();
        let slug = crate::domain::Slug::from_title(title).unwrap();
        store
            .create_article(NewArticle {
                author_id: author,
                title,
                slug: slug.as_str(),
                description: "desc",
                body: "body",
                tags: &tags,
            })
            .await
            .unwrap()
    }

    #[test]
    fn memory_url_detection() {
        assert!(is_memory_url("sqlite::memory:"));
        assert!(is_memory_url("sqlite:file:test?mode=memory&cache=shared"));
        assert!(!is_memory_url("sqlite:data/scribe.db"));
    }

    #[tokio::test]
    async fn user_lookup_and_password() {
        let store = store().await;
        let alice = user(&store, "alice").await;

        assert_eq!(alice.email, "alice@example.com");
        assert!(!alice.confirmed);
        assert!(alice.token.is_some());

        let by_email = store.get_user_by_email("ALICE@example.com").await.unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(alice.id));

        let token = alice.token.clone().unwrap();
        let by_token = store.get_user_by_token(&token).await.unwrap();
        assert_eq!(by_token.map(|u| u.id), Some(alice.id));

        assert!(store.verify_user_password(alice.id, "password123").await.unwrap());
        assert!(!store.verify_user_password(alice.id, "nope").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_username_is_a_unique_violation() {
        let store = store().await;
        user(&store, "alice").await;

        let err = store
            .create_user(
                NewUser {
                    username: "alice",
                    email: "other@example.com",
                    password: "password123",
                },
                &fast_security(),
            )
            .await
            .unwrap_err();

        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn rotating_token_invalidates_the_old_one() {
        let store = store().await;
        let alice = user(&store, "alice").await;
        let old = alice.token.unwrap();

        let new = store.rotate_user_token(alice.id).await.unwrap();
        assert_ne!(old, new);
        assert!(store.get_user_by_token(&old).await.unwrap().is_none());
        assert!(store.get_user_by_token(&new).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn confirm_requires_matching_token() {
        let store = store().await;
        let alice = user(&store, "alice").await;
        let token = store.get_user_confirm_token(alice.id).await.unwrap().unwrap();

        assert!(!store.confirm_user(alice.id, "bogus").await.unwrap());
        assert!(store.confirm_user(alice.id, &token).await.unwrap());
        assert!(store.get_user(alice.id).await.unwrap().unwrap().confirmed);
    }

    #[tokio::test]
    async fn follow_is_idempotent() {
        let store = store().await;
        let a = user(&store, "a").await;
        let b = user(&store, "b").await;

        store.follow(a.id, b.id).await.unwrap();
        store.follow(a.id, b.id).await.unwrap();
        assert!(store.is_following(a.id, b.id).await.unwrap());
        assert!(!store.is_following(b.id, a.id).await.unwrap());
        assert!(store.is_followed_by(b.id, a.id).await.unwrap());
        assert!(!store.is_followed_by(a.id, b.id).await.unwrap());

        store.unfollow(a.id, b.id).await.unwrap();
        store.unfollow(a.id, b.id).await.unwrap();
        assert!(!store.is_following(a.id, b.id).await.unwrap());
    }

    #[tokio::test]
    async fn article_tags_and_filters() {
        let store = store().await;
        let a = user(&store, "a").await;
        let b = user(&store, "b").await;

        let first = article(&store, a.id, "First post", &["rust", "web"]).await;
        let second = article(&store, b.id, "Second post", &["rust"]).await;

        let tags = store.tags_for_articles(&[first.id, second.id]).await.unwrap();
        assert_eq!(tags[&first.id], vec!["rust".to_string(), "web".to_string()]);
        assert_eq!(tags[&second.id], vec!["rust".to_string()]);
        assert_eq!(store.list_tag_names().await.unwrap(), vec!["rust", "web"]);

        let page = Page::default();
        let (all, total) = store.list_articles(&ArticleFilter::default(), page).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(all[0].id, second.id);

        let by_tag = ArticleFilter {
            tag: Some("web".into()),
            ..Default::default()
        };
        let (rows, total) = store.list_articles(&by_tag, page).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].id, first.id);

        let by_author = ArticleFilter {
            author: Some("b".into()),
            ..Default::default()
        };
        let (rows, _) = store.list_articles(&by_author, page).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, second.id);

        let unknown = ArticleFilter {
            tag: Some("nope".into()),
            ..Default::default()
        };
        let (rows, total) = store.list_articles(&unknown, page).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(total, 0);

        store.collect_article(a.id, second.id).await.unwrap();
        let favorited = ArticleFilter {
            favorited: Some("a".into()),
            ..Default::default()
        };
        let (rows, _) = store.list_articles(&favorited, page).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, second.id);
    }

    #[tokio::test]
    async fn update_replaces_tag_set() {
        let store = store().await;
        let a = user(&store, "a").await;
        let post = article(&store, a.id, "Tagged", &["one", "two"]).await;

        store
            .update_article(
                post.id,
                ArticleChanges {
                    tags: Some(vec!["three".into()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let tags = store.tags_for_articles(&[post.id]).await.unwrap();
        assert_eq!(tags[&post.id], vec!["three".to_string()]);
    }

    #[tokio::test]
    async fn feed_only_contains_followed_authors() {
        let store = store().await;
        let a = user(&store, "a").await;
        let b = user(&store, "b").await;
        let c = user(&store, "c").await;

        article(&store, b.id, "From b", &[]).await;
        article(&store, c.id, "From c", &[]).await;
        store.follow(a.id, b.id).await.unwrap();

        let (rows, total) = store.feed_articles(a.id, Page::default()).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].author_id, b.id);
    }

    #[tokio::test]
    async fn favorite_counts_group_by_article() {
        let store = store().await;
        let a = user(&store, "a").await;
        let b = user(&store, "b").await;
        let post = article(&store, a.id, "Popular", &[]).await;
        let quiet = article(&store, a.id, "Quiet", &[]).await;

        store.collect_article(a.id, post.id).await.unwrap();
        store.collect_article(b.id, post.id).await.unwrap();
        store.collect_article(b.id, post.id).await.unwrap();

        let counts = store.favorite_counts(&[post.id, quiet.id]).await.unwrap();
        assert_eq!(counts.get(&post.id), Some(&2));
        assert_eq!(counts.get(&quiet.id), None);

        let mine = store.collected_among(b.id, &[post.id, quiet.id]).await.unwrap();
        assert!(mine.contains(&post.id));
        assert!(!mine.contains(&quiet.id));

        store.uncollect_article(b.id, post.id).await.unwrap();
        assert!(!store.is_collecting(b.id, post.id).await.unwrap());
        assert!(store.is_collecting(a.id, post.id).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_a_user_removes_their_content() {
        let store = store().await;
        let a = user(&store, "a").await;
        let b = user(&store, "b").await;

        let post = article(&store, a.id, "Doomed", &["x"]).await;
        let other = article(&store, b.id, "Survivor", &[]).await;
        store.create_comment(post.id, b.id, "on a's post").await.unwrap();
        let own = store.create_comment(other.id, a.id, "a's comment").await.unwrap();
        store.collect_article(a.id, other.id).await.unwrap();
        store.follow(a.id, b.id).await.unwrap();
        store.follow(b.id, a.id).await.unwrap();

        assert!(store.delete_user(a.id).await.unwrap());

        assert!(store.get_article(post.id).await.unwrap().is_none());
        assert!(store.get_comment(own.id).await.unwrap().is_none());
        assert!(store.get_article(other.id).await.unwrap().is_some());
        assert!(store.favorite_counts(&[other.id]).await.unwrap().is_empty());
        assert!(!store.is_following(b.id, a.id).await.unwrap());
        assert_eq!(store.list_tag_names().await.unwrap(), vec!["x"]);
    }
}
