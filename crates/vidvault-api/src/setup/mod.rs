//! Application setup and initialization
//!
//! All initialization logic lives here rather than in main.rs: database and
//! migrations, storage backends, the ingestion pipelines, and routes.

pub mod routes;
pub mod server;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use vidvault_core::Config;
use vidvault_db::{PgVideoStore, VideoStore};
use vidvault_processing::{
    ContainerProber, FastStartRemuxer, SubprocessRunner, ThumbnailIngestPipeline,
    TokioCommandRunner, VideoIngestPipeline,
};
use vidvault_storage::{LocalStorage, ObjectStorage, S3Storage};

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    let pool = vidvault_db::connect(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to the metadata database")?;
    vidvault_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database connected and migrations applied");

    let videos: Arc<dyn VideoStore> = Arc::new(PgVideoStore::new(pool));

    // Thumbnails always live on the local filesystem, served under /assets.
    let thumbnail_storage: Arc<dyn ObjectStorage> = Arc::new(
        LocalStorage::new(config.assets_root.clone(), config.assets_base_url.clone())
            .await
            .context("Failed to initialize thumbnail storage")?,
    );

    let video_storage = setup_video_storage(&config).await?;

    let runner: Arc<dyn SubprocessRunner> = Arc::new(TokioCommandRunner::new(
        Duration::from_secs(config.tool_timeout_secs),
    ));
    let prober = Arc::new(ContainerProber::new(
        runner.clone(),
        config.ffprobe_path.clone(),
    ));
    let remuxer = Arc::new(FastStartRemuxer::new(runner, config.ffmpeg_path.clone()));

    let video_pipeline = VideoIngestPipeline::new(
        videos.clone(),
        video_storage,
        prober,
        remuxer,
        config.max_video_size_bytes,
    );
    let thumbnail_pipeline = ThumbnailIngestPipeline::new(
        videos.clone(),
        thumbnail_storage,
        config.max_thumbnail_size_bytes,
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        videos,
        video_pipeline,
        thumbnail_pipeline,
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

/// Videos go to S3 when a bucket is configured, otherwise to a local
/// directory next to the thumbnails.
async fn setup_video_storage(config: &Config) -> Result<Arc<dyn ObjectStorage>> {
    match (&config.s3_bucket, &config.s3_region) {
        (Some(bucket), Some(region)) => {
            tracing::info!(bucket = %bucket, region = %region, "Using S3 video storage");
            Ok(Arc::new(
                S3Storage::new(
                    bucket.clone(),
                    region.clone(),
                    config.s3_endpoint.clone(),
                    config.cdn_base_url.clone(),
                )
                .await
                .context("Failed to initialize S3 video storage")?,
            ))
        }
        _ => {
            tracing::warn!("S3_BUCKET not set, storing videos on the local filesystem");
            Ok(Arc::new(
                LocalStorage::new(
                    config.assets_root.join("videos"),
                    format!("{}/videos", config.assets_base_url),
                )
                .await
                .context("Failed to initialize local video storage")?,
            ))
        }
    }
}
