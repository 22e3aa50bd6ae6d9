use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, Data, TagsData};

/// GET /api/tags
pub async fn list_tags(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Data<TagsData>>>, ApiError> {
    let tags = state.article_service().tags().await?;
    Ok(Json(ApiResponse::success(Data {
        data: TagsData { tags },
    })))
}
