//! Shapes stored rows into response payloads.
//!
//! Every derived field (`following`, `favorited`, `favoritesCount`) is
//! computed against the explicit `viewer`. List presentation is batched: one
//! query each for authors, tags, favorite counts, the viewer's favorites and
//! the viewer's follows, regardless of how many rows are presented.

use anyhow::{Result, anyhow};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::db::{Article, Comment, Store, User};
use crate::domain::{CommentId, UserId};

/// The authenticated user as returned by register/login/current-user.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserDto {
    pub email: String,
    pub token: Option<String>,
    pub username: String,
    pub bio: Option<String>,
    pub image: Option<String>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            token: user.token.clone(),
            username: user.username.clone(),
            bio: user.bio.clone(),
            image: user.image.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProfileDto {
    pub username: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub following: bool,
}

impl ProfileDto {
    fn of(user: &User, following: bool) -> Self {
        Self {
            username: user.username.clone(),
            bio: user.bio.clone(),
            image: user.image.clone(),
            following,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDto {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    pub favorited: bool,
    pub favorites_count: i64,
    pub author: ProfileDto,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: CommentId,
    pub created_at: String,
    pub updated_at: String,
    pub body: String,
    pub author: ProfileDto,
}

pub struct Presenter<'a> {
    store: &'a Store,
    viewer: Option<UserId>,
}

impl<'a> Presenter<'a> {
    #[must_use]
    pub const fn new(store: &'a Store, viewer: Option<UserId>) -> Self {
        Self { store, viewer }
    }

    pub async fn profile(&self, user: &User) -> Result<ProfileDto> {
        let following = match self.viewer {
            Some(viewer) => self.store.is_following(viewer.value(), user.id).await?,
            None => false,
        };

        Ok(ProfileDto::of(user, following))
    }

    pub async fn article(&self, article: Article) -> Result<ArticleDto> {
        self.articles(vec![article])
            .await?
            .pop()
            .ok_or_else(|| anyhow!("Presenting a single article produced nothing"))
    }

    pub async fn articles(&self, articles: Vec<Article>) -> Result<Vec<ArticleDto>> {
        let ids: Vec<i32> = articles.iter().map(|a| a.id).collect();
        let author_ids = dedup(articles.iter().map(|a| a.author_id));

        let authors = self.users_by_id(&author_ids).await?;
        let following = self.following(&author_ids).await?;
        let mut tags = self.store.tags_for_articles(&ids).await?;
        let counts = self.store.favorite_counts(&ids).await?;
        let favorited = match self.viewer {
            Some(viewer) => self.store.collected_among(viewer.value(), &ids).await?,
            None => HashSet::new(),
        };

        articles
            .into_iter()
            .map(|article| {
                let author = authors
                    .get(&article.author_id)
                    .ok_or_else(|| anyhow!("Author {} of article {} missing", article.author_id, article.id))?;

                let mut tag_list = tags.remove(&article.id).unwrap_or_default();
                tag_list.sort();

                Ok(ArticleDto {
                    tag_list,
                    favorited: favorited.contains(&article.id),
                    favorites_count: counts.get(&article.id).copied().unwrap_or(0),
                    author: ProfileDto::of(author, following.contains(&article.author_id)),
                    slug: article.slug,
                    title: article.title,
                    description: article.description,
                    body: article.body,
                    created_at: article.created_at,
                    updated_at: article.updated_at,
                })
            })
            .collect()
    }

    pub async fn comment(&self, comment: Comment) -> Result<CommentDto> {
        self.comments(vec![comment])
            .await?
            .pop()
            .ok_or_else(|| anyhow!("Presenting a single comment produced nothing"))
    }

    pub async fn comments(&self, comments: Vec<Comment>) -> Result<Vec<CommentDto>> {
        let author_ids = dedup(comments.iter().map(|c| c.author_id));
        let authors = self.users_by_id(&author_ids).await?;
        let following = self.following(&author_ids).await?;

        comments
            .into_iter()
            .map(|comment| {
                let author = authors
                    .get(&comment.author_id)
                    .ok_or_else(|| anyhow!("Author {} of comment {} missing", comment.author_id, comment.id))?;

                Ok(CommentDto {
                    id: CommentId::new(comment.id),
                    created_at: comment.created_at,
                    updated_at: comment.updated_at,
                    body: comment.body,
                    author: ProfileDto::of(author, following.contains(&comment.author_id)),
                })
            })
            .collect()
    }

    async fn users_by_id(&self, ids: &[i32]) -> Result<HashMap<i32, User>> {
        Ok(self
            .store
            .get_users_by_ids(ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect())
    }

    async fn following(&self, ids: &[i32]) -> Result<HashSet<i32>> {
        match self.viewer {
            Some(viewer) => self.store.following_among(viewer.value(), ids).await,
            None => Ok(HashSet::new()),
        }
    }
}

fn dedup(ids: impl Iterator<Item = i32>) -> Vec<i32> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}
