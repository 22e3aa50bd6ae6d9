use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};
use std::sync::Arc;

use super::auth::{CurrentUser, MaybeUser};
use super::{ApiError, ApiResponse, AppState, Data, ProfileData};
use crate::services::{ProfileDto, ProfileError};

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::NotFound(name) => Self::no_profile(name),
            ProfileError::SelfFollow => Self::SelfFollow,
            ProfileError::Database(msg) => Self::DatabaseError(msg),
            ProfileError::Internal(msg) => Self::internal(msg),
        }
    }
}

type ProfileResponse = Json<ApiResponse<Data<ProfileData>>>;

fn profile_response(profile: ProfileDto) -> ProfileResponse {
    Json(ApiResponse::success(Data {
        data: ProfileData { profile },
    }))
}

/// GET /api/profiles/{username}
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    viewer: MaybeUser,
    path: Result<Path<String>, PathRejection>,
) -> Result<ProfileResponse, ApiError> {
    let Path(username) = path?;
    let profile = state.profile_service().get(&username, viewer.id()).await?;
    Ok(profile_response(profile))
}

/// POST /api/profiles/{username}/follow
pub async fn follow(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    path: Result<Path<String>, PathRejection>,
) -> Result<ProfileResponse, ApiError> {
    let Path(username) = path?;
    let profile = state
        .profile_service()
        .follow(current.id(), &username)
        .await?;
    Ok(profile_response(profile))
}

/// DELETE /api/profiles/{username}/follow
pub async fn unfollow(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    path: Result<Path<String>, PathRejection>,
) -> Result<ProfileResponse, ApiError> {
    let Path(username) = path?;
    let profile = state
        .profile_service()
        .unfollow(current.id(), &username)
        .await?;
    Ok(profile_response(profile))
}
