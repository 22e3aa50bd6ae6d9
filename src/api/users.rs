use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::{CurrentUser, SESSION_USER_KEY};
use super::validation::{validate_email, validate_password, validate_username};
use super::{
    ApiError, ApiResponse, AppState, ConfirmRequest, Data, LoginRequest, UserBody, UserData,
};
use crate::services::{AuthError, Registration, UserDto, UserUpdate};

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateUser(msg) => Self::DuplicateUser(msg),
            AuthError::EmailNotRegistered => Self::EmailNotRegistered,
            AuthError::InvalidCredentials => Self::BadCredentials,
            AuthError::Unauthenticated => Self::Unauthenticated,
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

type UserResponse = Json<ApiResponse<Data<UserData>>>;

fn user_response(user: UserDto) -> UserResponse {
    Json(ApiResponse::success(Data {
        data: UserData { user },
    }))
}

/// POST /api/users
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UserBody<Registration>>, JsonRejection>,
) -> Result<UserResponse, ApiError> {
    let Json(UserBody { user }) = payload?;
    let min_len = state.config().security.min_password_length;

    let registration = Registration {
        username: validate_username(&user.username)?.to_string(),
        email: validate_email(&user.email)?.to_string(),
        password: validate_password(&user.password, min_len)?.to_string(),
    };

    let signed_in = state.auth_service().register(registration).await?;
    Ok(user_response(signed_in.user))
}

/// POST /api/users/login
/// Verifies credentials, rotates the bearer token and starts a session.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    payload: Result<Json<UserBody<LoginRequest>>, JsonRejection>,
) -> Result<UserResponse, ApiError> {
    let Json(UserBody { user }) = payload?;

    if user.email.trim().is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if user.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let signed_in = state
        .auth_service()
        .login(user.email.trim(), &user.password)
        .await?;

    session
        .insert(SESSION_USER_KEY, signed_in.user_id.value())
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    tracing::info!(user_id = %signed_in.user_id, "User logged in");
    Ok(user_response(signed_in.user))
}

/// POST /api/users/logout
pub async fn logout(session: Session) -> Result<Json<ApiResponse<()>>, ApiError> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to clear session: {e}")))?;
    Ok(Json(ApiResponse::ok()))
}

/// POST /api/users/confirm
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    payload: Result<Json<UserBody<ConfirmRequest>>, JsonRejection>,
) -> Result<UserResponse, ApiError> {
    let Json(UserBody { user }) = payload?;
    let dto = state
        .auth_service()
        .confirm(current.id(), user.token.trim())
        .await?;
    Ok(user_response(dto))
}

/// GET /api/user
pub async fn current_user(current: CurrentUser) -> UserResponse {
    user_response(UserDto::from(&current.0))
}

/// PUT /api/user
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    payload: Result<Json<UserBody<UserUpdate>>, JsonRejection>,
) -> Result<UserResponse, ApiError> {
    let Json(UserBody { user: mut update }) = payload?;
    let min_len = state.config().security.min_password_length;

    update.email = update
        .email
        .as_deref()
        .map(validate_email)
        .transpose()?
        .map(str::to_string);
    update.username = update
        .username
        .as_deref()
        .map(validate_username)
        .transpose()?
        .map(str::to_string);
    if let Some(password) = &update.password {
        validate_password(password, min_len)?;
    }

    let dto = state.auth_service().update(current.id(), update).await?;
    Ok(user_response(dto))
}
