use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use vidvault_core::models::Video;
use vidvault_core::AppError;

use crate::auth::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;

const FIELD_NAME: &str = "video";

/// POST /api/v0/videos/{video_id}/video
///
/// Ingest an MP4 upload for an existing video record: stage, probe its
/// orientation, remux for fast start, upload, and persist the resulting URL.
/// The file must arrive as the multipart field named `video`.
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<Uuid>,
    AuthUser(user_id): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<Video>, HttpAppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("invalid multipart body: {}", e)))?
    {
        if field.name() != Some(FIELD_NAME) {
            continue;
        }

        let content_type = field
            .content_type()
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "multipart field '{}' is missing a content type",
                    FIELD_NAME
                ))
            })?
            .to_string();

        // The field body streams straight into staging; it is never
        // buffered whole in memory.
        let video = state
            .video_pipeline
            .run(user_id, video_id, &content_type, Box::pin(field))
            .await?;
        return Ok(Json(video));
    }

    Err(AppError::InvalidInput(format!("multipart field '{}' is required", FIELD_NAME)).into())
}
