use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;

/// Numeric result codes carried in every response envelope.
pub mod codes {
    pub const SUCCESS: u32 = 10000;
    pub const DUPLICATE_USER: u32 = 10001;
    pub const EMAIL_NOT_REGISTERED: u32 = 10002;
    pub const UNAUTHENTICATED: u32 = 10003;
    pub const NOT_FOUND: u32 = 10004;
    pub const DUPLICATE_ARTICLE: u32 = 10005;
    pub const NOT_AUTHOR: u32 = 10006;
    pub const SELF_FOLLOW: u32 = 10007;
    pub const VALIDATION: u32 = 10008;
    pub const BAD_CREDENTIALS: u32 = 10009;
    pub const INTERNAL: u32 = 10010;
}

#[derive(Debug)]
pub enum ApiError {
    DuplicateUser(String),

    EmailNotRegistered,

    Unauthenticated,

    /// `message` names what is missing ("no article", "no comment", ...).
    NotFound { message: &'static str, detail: String },

    DuplicateArticle(String),

    NotAuthor,

    SelfFollow,

    ValidationError(String),

    BadCredentials,

    DatabaseError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateUser(msg) => write!(f, "Duplicate user: {msg}"),
            Self::EmailNotRegistered => write!(f, "Email not registered"),
            Self::Unauthenticated => write!(f, "Unauthenticated"),
            Self::NotFound { message, detail } => write!(f, "{message}: {detail}"),
            Self::DuplicateArticle(msg) => write!(f, "Duplicate article: {msg}"),
            Self::NotAuthor => write!(f, "Not author"),
            Self::SelfFollow => write!(f, "Cannot follow yourself"),
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::BadCredentials => write!(f, "Bad credentials"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::DuplicateUser(_) => codes::DUPLICATE_USER,
            Self::EmailNotRegistered => codes::EMAIL_NOT_REGISTERED,
            Self::Unauthenticated => codes::UNAUTHENTICATED,
            Self::NotFound { .. } => codes::NOT_FOUND,
            Self::DuplicateArticle(_) => codes::DUPLICATE_ARTICLE,
            Self::NotAuthor => codes::NOT_AUTHOR,
            Self::SelfFollow => codes::SELF_FOLLOW,
            Self::ValidationError(_) => codes::VALIDATION,
            Self::BadCredentials => codes::BAD_CREDENTIALS,
            Self::DatabaseError(_) | Self::InternalError(_) => codes::INTERNAL,
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::DuplicateUser(_) | Self::DuplicateArticle(_) => StatusCode::CONFLICT,
            Self::EmailNotRegistered | Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unauthenticated | Self::BadCredentials => StatusCode::UNAUTHORIZED,
            Self::NotAuthor => StatusCode::FORBIDDEN,
            Self::SelfFollow => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::DatabaseError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (message, detail) = match &self {
            Self::DuplicateUser(msg) => ("user already registered", msg.clone()),
            Self::EmailNotRegistered => (
                "email not registered",
                "no account uses this email address".to_string(),
            ),
            Self::Unauthenticated => ("unauthenticated", "login required".to_string()),
            Self::NotFound { message, detail } => (*message, detail.clone()),
            Self::DuplicateArticle(msg) => ("article already exists", msg.clone()),
            Self::NotAuthor => ("not author", "only the author may do this".to_string()),
            Self::SelfFollow => ("cannot follow yourself", "target is the current user".to_string()),
            Self::ValidationError(msg) => ("validation failed", msg.clone()),
            Self::BadCredentials => ("fail", "wrong email or password".to_string()),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                ("fail", "A database error occurred".to_string())
            }
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("fail", "An internal error occurred".to_string())
            }
        };

        let body = ApiResponse::<()>::error(self.code(), message, detail);
        (self.status(), Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(format!("{err:#}"))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::ValidationError(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::ValidationError(rejection.body_text())
    }
}

impl ApiError {
    pub fn no_article(slug: impl fmt::Display) -> Self {
        Self::NotFound {
            message: "no article",
            detail: format!("article '{slug}' does not exist"),
        }
    }

    pub fn no_comment(id: impl fmt::Display) -> Self {
        Self::NotFound {
            message: "no comment",
            detail: format!("comment {id} does not exist on this article"),
        }
    }

    pub fn no_route(path: impl fmt::Display) -> Self {
        Self::NotFound {
            message: "not found",
            detail: format!("no route for {path}"),
        }
    }

    pub fn no_profile(username: impl fmt::Display) -> Self {
        Self::NotFound {
            message: "no profile",
            detail: format!("user '{username}' does not exist"),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}
