//! Shared application state.

use std::sync::Arc;
use vidvault_core::Config;
use vidvault_db::VideoStore;
use vidvault_processing::{ThumbnailIngestPipeline, VideoIngestPipeline};

/// Handlers receive the state as `Arc<AppState>`; everything inside is
/// already shared or cheap to clone.
pub struct AppState {
    pub config: Config,
    pub videos: Arc<dyn VideoStore>,
    pub video_pipeline: VideoIngestPipeline,
    pub thumbnail_pipeline: ThumbnailIngestPipeline,
}
