use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use vidvault_core::models::Video;
use vidvault_core::AppError;

use crate::auth::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;

/// GET /api/v0/videos/{video_id}
///
/// Fetch a single video record. Only the owner may read it.
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<Uuid>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Video>, HttpAppError> {
    let video = state
        .videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("video {}", video_id)))?;

    if video.user_id != user_id {
        return Err(AppError::Unauthorized("video belongs to another user".to_string()).into());
    }

    Ok(Json(video))
}
