//! Route configuration and setup

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use vidvault_core::Config;

use crate::handlers;
use crate::state::AppState;

/// Headroom on top of the media ceiling for multipart boundaries, part
/// headers, and the other form fields of an upload request.
const MULTIPART_OVERHEAD_BYTES: u64 = 1 << 20;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router> {
    let cors = setup_cors(config)?;

    let thumbnail_limit = (config.max_thumbnail_size_bytes + MULTIPART_OVERHEAD_BYTES) as usize;
    let video_limit = (config.max_video_size_bytes + MULTIPART_OVERHEAD_BYTES) as usize;

    // Body limits are per route: a thumbnail request must not be allowed to
    // carry a video-sized body. Axum's default 2 MB body limit is raised
    // explicitly, then tower-http enforces the outer ceiling.
    let thumbnail_routes = Router::new()
        .route(
            "/api/v0/videos/{video_id}/thumbnail",
            post(handlers::upload_thumbnail),
        )
        .layer(DefaultBodyLimit::max(thumbnail_limit))
        .layer(RequestBodyLimitLayer::new(thumbnail_limit));

    let video_routes = Router::new()
        .route(
            "/api/v0/videos/{video_id}/video",
            post(handlers::upload_video),
        )
        .layer(DefaultBodyLimit::max(video_limit))
        .layer(RequestBodyLimitLayer::new(video_limit));

    // Server-level concurrency limit to protect against resource exhaustion under extreme load
    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);

    let app = Router::new()
        .route("/api/v0/healthz", get(handlers::healthz))
        .route("/api/v0/videos/{video_id}", get(handlers::get_video))
        .merge(thumbnail_routes)
        .merge(video_routes)
        .nest_service("/assets", ServeDir::new(&config.assets_root))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer> {
    if config.cors_origins.is_empty() {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any));
    }

    let origins = config
        .cors_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("Invalid CORS origin")?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE]))
}
