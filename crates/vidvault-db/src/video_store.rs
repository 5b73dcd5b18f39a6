//! Video metadata repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use vidvault_core::models::Video;
use vidvault_core::AppError;

/// Metadata store operation errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("video not found: {0}")]
    NotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(format!("video {}", id)),
            StoreError::Database(e) => AppError::Database(e.to_string()),
        }
    }
}

/// Metadata store contract used by the ingestion pipeline.
///
/// The pipeline only ever reads a record to check ownership and writes a
/// single URL field after a successful upload. Updates are single atomic
/// record writes keyed by video id; last-writer-wins across concurrent
/// updates to the same video is acceptable.
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, StoreError>;

    /// Set the thumbnail URL, returning the updated record.
    async fn set_thumbnail_url(&self, id: Uuid, url: &str) -> Result<Video, StoreError>;

    /// Set the video URL, returning the updated record.
    async fn set_video_url(&self, id: Uuid, url: &str) -> Result<Video, StoreError>;
}

/// Postgres-backed video store.
#[derive(Clone)]
pub struct PgVideoStore {
    pool: PgPool,
}

impl PgVideoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoStore for PgVideoStore {
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, StoreError> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            SELECT id, user_id, title, description, thumbnail_url, video_url,
                   created_at, updated_at
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    async fn set_thumbnail_url(&self, id: Uuid, url: &str) -> Result<Video, StoreError> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            UPDATE videos
            SET thumbnail_url = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, user_id, title, description, thumbnail_url, video_url,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))?;

        tracing::debug!(video_id = %id, "thumbnail URL updated");
        Ok(video)
    }

    async fn set_video_url(&self, id: Uuid, url: &str) -> Result<Video, StoreError> {
        let video = sqlx::query_as::<_, Video>(
            r#"
            UPDATE videos
            SET video_url = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, user_id, title, description, thumbnail_url, video_url,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))?;

        tracing::debug!(video_id = %id, "video URL updated");
        Ok(video)
    }
}
