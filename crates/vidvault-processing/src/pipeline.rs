//! Ingestion orchestration.
//!
//! The pipelines own the end-to-end ordering of an upload: authorize,
//! negotiate, stage, (probe, remux,) upload, persist. The object is always
//! written before the metadata record is updated; if the metadata write
//! fails the object is left in place and the failure is surfaced, so a
//! record never points at a URL that does not exist.

use bytes::Bytes;
use futures::Stream;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempPath;
use tokio::fs::File;
use uuid::Uuid;
use vidvault_core::keygen::random_asset_id;
use vidvault_core::models::Video;
use vidvault_core::AppError;
use vidvault_db::VideoStore;
use vidvault_storage::{ObjectStorage, StorageKey};

use crate::probe::ContainerProber;
use crate::remux::FastStartRemuxer;
use crate::staging::StagedFile;
use crate::validator::{negotiate, THUMBNAIL_CONTENT_TYPES, VIDEO_CONTENT_TYPES};

/// Checkpoints of an ingestion run, in order. Thumbnails skip the probe and
/// remux stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Received,
    Authorized,
    Validated,
    Staged,
    Probed,
    Remuxed,
    Uploaded,
    Persisted,
    Complete,
}

impl IngestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestStage::Received => "received",
            IngestStage::Authorized => "authorized",
            IngestStage::Validated => "validated",
            IngestStage::Staged => "staged",
            IngestStage::Probed => "probed",
            IngestStage::Remuxed => "remuxed",
            IngestStage::Uploaded => "uploaded",
            IngestStage::Persisted => "persisted",
            IngestStage::Complete => "complete",
        }
    }
}

/// Per-run state: the current stage tag and the scratch files the run has
/// produced so far. Scratch paths are deleted when the context drops, which
/// covers every exit path, success and failure alike.
struct IngestContext {
    video_id: Uuid,
    stage: IngestStage,
    scratch: Vec<TempPath>,
}

impl IngestContext {
    fn new(video_id: Uuid) -> Self {
        Self {
            video_id,
            stage: IngestStage::Received,
            scratch: Vec::new(),
        }
    }

    fn advance(&mut self, next: IngestStage) {
        tracing::info!(
            video_id = %self.video_id,
            from = self.stage.as_str(),
            to = next.as_str(),
            "ingest stage"
        );
        self.stage = next;
    }

    /// Take ownership of a scratch file for the remainder of the run,
    /// returning a plain path to hand to tools and uploads.
    fn adopt(&mut self, path: TempPath) -> PathBuf {
        let plain = path.to_path_buf();
        self.scratch.push(path);
        plain
    }
}

/// Resolve the target record and check that the caller owns it.
async fn authorize(
    videos: &dyn VideoStore,
    video_id: Uuid,
    user_id: Uuid,
) -> Result<Video, AppError> {
    let video = videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("video {}", video_id)))?;

    if video.user_id != user_id {
        return Err(AppError::Unauthorized(
            "video belongs to another user".to_string(),
        ));
    }

    Ok(video)
}

/// Full video ingestion: stage to disk, probe orientation, remux for
/// fast start, upload under an orientation-bucketed key, persist the URL.
pub struct VideoIngestPipeline {
    videos: Arc<dyn VideoStore>,
    storage: Arc<dyn ObjectStorage>,
    prober: Arc<ContainerProber>,
    remuxer: Arc<FastStartRemuxer>,
    max_bytes: u64,
}

impl VideoIngestPipeline {
    pub fn new(
        videos: Arc<dyn VideoStore>,
        storage: Arc<dyn ObjectStorage>,
        prober: Arc<ContainerProber>,
        remuxer: Arc<FastStartRemuxer>,
        max_bytes: u64,
    ) -> Self {
        Self {
            videos,
            storage,
            prober,
            remuxer,
            max_bytes,
        }
    }

    pub async fn run<S, E>(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        declared_content_type: &str,
        stream: S,
    ) -> Result<Video, AppError>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Display,
    {
        let mut ctx = IngestContext::new(video_id);

        authorize(self.videos.as_ref(), video_id, user_id).await?;
        ctx.advance(IngestStage::Authorized);

        // Reject before any byte of the body is read.
        let content_type = negotiate(declared_content_type, VIDEO_CONTENT_TYPES)
            .map_err(AppError::from)?;
        ctx.advance(IngestStage::Validated);

        let staged = StagedFile::from_stream(stream, self.max_bytes).await?;
        let (_, staged_temp) = staged.into_parts();
        let staged_path = ctx.adopt(staged_temp);
        ctx.advance(IngestStage::Staged);

        let profile = self.prober.probe(&staged_path).await?;
        let orientation = profile.orientation();
        ctx.advance(IngestStage::Probed);

        let remuxed_path = ctx.adopt(self.remuxer.remux(&staged_path).await?);
        ctx.advance(IngestStage::Remuxed);

        let key = StorageKey::for_video(orientation, &content_type, random_asset_id())
            .map_err(AppError::from)?;
        let reader = File::open(&remuxed_path).await?;
        let url = self
            .storage
            .put_stream(&key.as_path(), &content_type, Box::pin(reader))
            .await
            .map_err(AppError::from)?;
        ctx.advance(IngestStage::Uploaded);

        let video = match self.videos.set_video_url(video_id, &url).await {
            Ok(video) => video,
            Err(err) => {
                // The object is already durable. Leave it in place rather
                // than risk a record that points at a deleted URL.
                tracing::warn!(
                    video_id = %video_id,
                    storage_key = %key,
                    "metadata update failed after upload, stored object is orphaned"
                );
                return Err(err.into());
            }
        };
        ctx.advance(IngestStage::Persisted);

        ctx.advance(IngestStage::Complete);
        tracing::info!(
            video_id = %video_id,
            orientation = orientation.as_str(),
            storage_key = %key,
            "video ingestion complete"
        );
        Ok(video)
    }
}

/// Thumbnail ingestion: stage, upload under a flat key, persist the URL.
/// No probing or remuxing; thumbnails are stored as received.
pub struct ThumbnailIngestPipeline {
    videos: Arc<dyn VideoStore>,
    storage: Arc<dyn ObjectStorage>,
    max_bytes: u64,
}

impl ThumbnailIngestPipeline {
    pub fn new(
        videos: Arc<dyn VideoStore>,
        storage: Arc<dyn ObjectStorage>,
        max_bytes: u64,
    ) -> Self {
        Self {
            videos,
            storage,
            max_bytes,
        }
    }

    pub async fn run<S, E>(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        declared_content_type: &str,
        stream: S,
    ) -> Result<Video, AppError>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Display,
    {
        let mut ctx = IngestContext::new(video_id);

        authorize(self.videos.as_ref(), video_id, user_id).await?;
        ctx.advance(IngestStage::Authorized);

        let content_type = negotiate(declared_content_type, THUMBNAIL_CONTENT_TYPES)
            .map_err(AppError::from)?;
        ctx.advance(IngestStage::Validated);

        let staged = StagedFile::from_stream(stream, self.max_bytes).await?;
        // The staged handle is already rewound, upload straight from it.
        let (reader, staged_temp) = staged.into_parts();
        ctx.adopt(staged_temp);
        ctx.advance(IngestStage::Staged);

        let key = StorageKey::for_thumbnail(&content_type, random_asset_id())
            .map_err(AppError::from)?;
        let url = self
            .storage
            .put_stream(&key.as_path(), &content_type, Box::pin(reader))
            .await
            .map_err(AppError::from)?;
        ctx.advance(IngestStage::Uploaded);

        let video = match self.videos.set_thumbnail_url(video_id, &url).await {
            Ok(video) => video,
            Err(err) => {
                tracing::warn!(
                    video_id = %video_id,
                    storage_key = %key,
                    "metadata update failed after upload, stored object is orphaned"
                );
                return Err(err.into());
            }
        };
        ctx.advance(IngestStage::Persisted);

        ctx.advance(IngestStage::Complete);
        tracing::info!(
            video_id = %video_id,
            storage_key = %key,
            "thumbnail ingestion complete"
        );
        Ok(video)
    }
}
