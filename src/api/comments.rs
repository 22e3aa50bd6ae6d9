use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use std::sync::Arc;

use super::auth::{CurrentUser, MaybeUser};
use super::{ApiError, ApiResponse, AppState, CommentBody, CommentPayload, CommentsPayload};
use crate::domain::CommentId;
use crate::services::CommentError;

impl From<CommentError> for ApiError {
    fn from(err: CommentError) -> Self {
        match err {
            CommentError::ArticleNotFound(slug) => Self::no_article(slug),
            CommentError::NotFound(id) => Self::no_comment(id),
            CommentError::NotAuthor => Self::NotAuthor,
            CommentError::Validation(msg) => Self::validation(msg),
            CommentError::Database(msg) => Self::DatabaseError(msg),
            CommentError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// POST /api/articles/{slug}/comments
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<CommentBody>, JsonRejection>,
) -> Result<Json<ApiResponse<CommentPayload>>, ApiError> {
    let Path(slug) = path?;
    let Json(CommentBody { comment }) = payload?;

    // Blank bodies are rejected by the service once the article is known to
    // exist.
    let comment = state
        .comment_service()
        .add(current.id(), &slug, &comment.body)
        .await?;
    Ok(Json(ApiResponse::success(CommentPayload { comment })))
}

/// GET /api/articles/{slug}/comments
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    viewer: MaybeUser,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<ApiResponse<CommentsPayload>>, ApiError> {
    let Path(slug) = path?;
    let comments = state.comment_service().list(&slug, viewer.id()).await?;
    Ok(Json(ApiResponse::success(CommentsPayload { comments })))
}

/// DELETE /api/articles/{slug}/comments/{id}
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    path: Result<Path<(String, i32)>, PathRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let Path((slug, id)) = path?;
    if id <= 0 {
        return Err(ApiError::no_comment(id));
    }

    state
        .comment_service()
        .delete(current.id(), &slug, CommentId::new(id))
        .await?;
    Ok(Json(ApiResponse::ok()))
}
