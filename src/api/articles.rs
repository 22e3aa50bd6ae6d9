use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use std::sync::Arc;

use super::auth::{CurrentUser, MaybeUser};
use super::validation::{validate_not_blank, validate_title};
use super::{ApiError, ApiResponse, AppState, ArticleBody, ArticlePayload, PageQuery};
use crate::services::{
    ArticleDto, ArticleError, ArticleList, ArticleListQuery, ArticleUpdate, NewArticleInput,
};

impl From<ArticleError> for ApiError {
    fn from(err: ArticleError) -> Self {
        match err {
            ArticleError::NotFound(slug) => Self::no_article(slug),
            ArticleError::DuplicateTitle(msg) => Self::DuplicateArticle(msg),
            ArticleError::NotAuthor => Self::NotAuthor,
            ArticleError::Validation(msg) => Self::validation(msg),
            ArticleError::Database(msg) => Self::DatabaseError(msg),
            ArticleError::Internal(msg) => Self::internal(msg),
        }
    }
}

type ArticleResponse = Json<ApiResponse<ArticlePayload>>;

fn article_response(article: ArticleDto) -> ArticleResponse {
    Json(ApiResponse::success(ArticlePayload { article }))
}

/// GET /api/articles
/// Filters: `tag`, `author`, `favorited` (username); paging: `limit`, `offset`.
pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    viewer: MaybeUser,
    query: Result<Query<ArticleListQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<ArticleList>>, ApiError> {
    let Query(query) = query?;
    let list = state.article_service().list(query, viewer.id()).await?;
    Ok(Json(ApiResponse::success(list)))
}

/// GET /api/articles/feed
pub async fn feed(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<ArticleList>>, ApiError> {
    let Query(page) = query?;
    let list = state
        .article_service()
        .feed(current.id(), page.limit, page.offset)
        .await?;
    Ok(Json(ApiResponse::success(list)))
}

/// GET /api/articles/{slug}
pub async fn get_article(
    State(state): State<Arc<AppState>>,
    viewer: MaybeUser,
    path: Result<Path<String>, PathRejection>,
) -> Result<ArticleResponse, ApiError> {
    let Path(slug) = path?;
    let article = state.article_service().get(&slug, viewer.id()).await?;
    Ok(article_response(article))
}

/// POST /api/articles
pub async fn create_article(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    payload: Result<Json<ArticleBody<NewArticleInput>>, JsonRejection>,
) -> Result<ArticleResponse, ApiError> {
    let Json(ArticleBody { article: mut input }) = payload?;

    input.title = validate_title(&input.title)?.to_string();
    validate_not_blank("description", &input.description)?;
    validate_not_blank("body", &input.body)?;

    let article = state.article_service().create(current.id(), input).await?;
    Ok(article_response(article))
}

/// PUT /api/articles/{slug}
pub async fn update_article(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<ArticleBody<ArticleUpdate>>, JsonRejection>,
) -> Result<ArticleResponse, ApiError> {
    let Path(slug) = path?;
    let Json(ArticleBody { article: mut update }) = payload?;

    update.title = update
        .title
        .as_deref()
        .map(validate_title)
        .transpose()?
        .map(str::to_string);
    if let Some(description) = &update.description {
        validate_not_blank("description", description)?;
    }
    if let Some(body) = &update.body {
        validate_not_blank("body", body)?;
    }

    let article = state
        .article_service()
        .update(current.id(), &slug, update)
        .await?;
    Ok(article_response(article))
}

/// DELETE /api/articles/{slug}
pub async fn delete_article(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let Path(slug) = path?;
    state.article_service().delete(current.id(), &slug).await?;
    Ok(Json(ApiResponse::ok()))
}

/// POST /api/articles/{slug}/favorite
pub async fn favorite(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    path: Result<Path<String>, PathRejection>,
) -> Result<ArticleResponse, ApiError> {
    let Path(slug) = path?;
    let article = state.article_service().favorite(current.id(), &slug).await?;
    Ok(article_response(article))
}

/// DELETE /api/articles/{slug}/favorite
pub async fn unfavorite(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    path: Result<Path<String>, PathRejection>,
) -> Result<ArticleResponse, ApiError> {
    let Path(slug) = path?;
    let article = state
        .article_service()
        .unfavorite(current.id(), &slug)
        .await?;
    Ok(article_response(article))
}
