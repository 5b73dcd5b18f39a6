//! Configuration module
//!
//! Application configuration loaded from environment variables, validated at
//! startup. Covers the HTTP server, metadata database, JWT verification,
//! thumbnail and video storage backends, size ceilings, and the external
//! media tools (ffprobe/ffmpeg).

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
/// 10 MiB thumbnail ceiling, 1 GiB video ceiling.
const DEFAULT_MAX_THUMBNAIL_SIZE_BYTES: u64 = 10 << 20;
const DEFAULT_MAX_VIDEO_SIZE_BYTES: u64 = 1 << 30;
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 120;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    /// Root directory for locally stored assets (thumbnails).
    pub assets_root: PathBuf,
    /// Public base URL under which `assets_root` is served.
    pub assets_base_url: String,
    // Remote object storage for videos. When `s3_bucket` is unset the
    // service falls back to local storage under `assets_root`.
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO etc.).
    pub s3_endpoint: Option<String>,
    /// Public base URL for uploaded videos (CDN distribution in front of the
    /// bucket). Falls back to the backend's native URL when unset.
    pub cdn_base_url: Option<String>,
    pub max_thumbnail_size_bytes: u64,
    pub max_video_size_bytes: u64,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// Ceiling on a single ffprobe/ffmpeg invocation; a hung tool must not
    /// hold staged files indefinitely.
    pub tool_timeout_secs: u64,
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env_opt(name) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("invalid value for {}", name)),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let server_port: u16 = env_parse("PORT", DEFAULT_PORT)?;

        let config = Config {
            server_port,
            environment: env_or("ENVIRONMENT", "development"),
            cors_origins: env_opt("CORS_ORIGINS")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_default(),
            database_url: env_opt("DATABASE_URL").context("DATABASE_URL must be set")?,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            jwt_secret: env_opt("JWT_SECRET").context("JWT_SECRET must be set")?,
            assets_root: PathBuf::from(env_or("ASSETS_ROOT", "./assets")),
            assets_base_url: env_or(
                "ASSETS_BASE_URL",
                &format!("http://localhost:{}/assets", server_port),
            ),
            s3_bucket: env_opt("S3_BUCKET"),
            s3_region: env_opt("S3_REGION"),
            s3_endpoint: env_opt("S3_ENDPOINT"),
            cdn_base_url: env_opt("CDN_BASE_URL"),
            max_thumbnail_size_bytes: env_parse(
                "MAX_THUMBNAIL_SIZE_BYTES",
                DEFAULT_MAX_THUMBNAIL_SIZE_BYTES,
            )?,
            max_video_size_bytes: env_parse("MAX_VIDEO_SIZE_BYTES", DEFAULT_MAX_VIDEO_SIZE_BYTES)?,
            ffmpeg_path: env_or("FFMPEG_PATH", "ffmpeg"),
            ffprobe_path: env_or("FFPROBE_PATH", "ffprobe"),
            tool_timeout_secs: env_parse("TOOL_TIMEOUT_SECS", DEFAULT_TOOL_TIMEOUT_SECS)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.jwt_secret.len() < 32 {
            bail!("JWT_SECRET must be at least 32 bytes");
        }
        if self.max_thumbnail_size_bytes == 0 || self.max_video_size_bytes == 0 {
            bail!("size ceilings must be greater than zero");
        }
        if self.s3_bucket.is_some() && self.s3_region.is_none() {
            bail!("S3_REGION must be set when S3_BUCKET is set");
        }
        if self.tool_timeout_secs == 0 {
            bail!("TOOL_TIMEOUT_SECS must be greater than zero");
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server_port: 8080,
            environment: "development".into(),
            cors_origins: vec![],
            database_url: "postgres://localhost/vidvault".into(),
            db_max_connections: 20,
            jwt_secret: "0123456789abcdef0123456789abcdef".into(),
            assets_root: PathBuf::from("./assets"),
            assets_base_url: "http://localhost:8080/assets".into(),
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            cdn_base_url: None,
            max_thumbnail_size_bytes: DEFAULT_MAX_THUMBNAIL_SIZE_BYTES,
            max_video_size_bytes: DEFAULT_MAX_VIDEO_SIZE_BYTES,
            ffmpeg_path: "ffmpeg".into(),
            ffprobe_path: "ffprobe".into(),
            tool_timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let mut config = base_config();
        config.jwt_secret = "short".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bucket_without_region_rejected() {
        let mut config = base_config();
        config.s3_bucket = Some("vidvault-media".into());
        assert!(config.validate().is_err());
        config.s3_region = Some("us-east-1".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_is_production() {
        let mut config = base_config();
        assert!(!config.is_production());
        config.environment = "PRODUCTION".into();
        assert!(config.is_production());
    }
}
