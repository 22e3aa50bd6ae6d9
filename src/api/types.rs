use serde::{Deserialize, Serialize};

use super::error::codes;
use crate::services::{ArticleDto, CommentDto, ProfileDto, UserDto};

/// Envelope of every response: `{code, message, <payload>, errors?}`.
///
/// The payload is flattened, so its own keys (`data`, `article`,
/// `articles`/`articlesCount`, `comment`, `comments`) sit next to `code`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u32,
    pub message: String,
    #[serde(flatten)]
    pub payload: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub body: Vec<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(payload: T) -> Self {
        Self {
            code: codes::SUCCESS,
            message: "success".to_string(),
            payload: Some(payload),
            errors: None,
        }
    }

    pub fn error(code: u32, message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            payload: None,
            errors: Some(ErrorBody {
                body: vec![detail.into()],
            }),
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload (deletes, logout).
    #[must_use]
    pub fn ok() -> Self {
        Self {
            code: codes::SUCCESS,
            message: "success".to_string(),
            payload: None,
            errors: None,
        }
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// `{"data": {...}}`, used for users, profiles and tags.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct UserData {
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
pub struct ProfileData {
    pub profile: ProfileDto,
}

#[derive(Debug, Serialize)]
pub struct TagsData {
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ArticlePayload {
    pub article: ArticleDto,
}

#[derive(Debug, Serialize)]
pub struct CommentPayload {
    pub comment: CommentDto,
}

#[derive(Debug, Serialize)]
pub struct CommentsPayload {
    pub comments: Vec<CommentDto>,
}

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: &'static str,
    pub database: bool,
    pub uptime_seconds: u64,
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UserBody<T> {
    pub user: T,
}

#[derive(Debug, Deserialize)]
pub struct ArticleBody<T> {
    pub article: T,
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub comment: NewComment,
}

#[derive(Debug, Deserialize)]
pub struct NewComment {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub token: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}
