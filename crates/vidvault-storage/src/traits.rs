//! Storage abstraction trait
//!
//! This module defines the ObjectStorage trait that all storage backends must
//! implement, so the ingestion pipeline can target S3 or the local filesystem
//! without coupling to implementation details.

use async_trait::async_trait;
use bytes::Bytes;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;
use vidvault_core::AppError;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(key),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Local,
}

/// Storage abstraction trait
///
/// Uploads are tagged with the asset's original content type and return the
/// publicly accessible URL of the stored object. The uploader never touches
/// metadata; write-after-write ordering (object first, metadata second) is
/// the orchestrator's responsibility.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload a buffered object under the given key; returns the public URL.
    async fn put(&self, key: &str, content_type: &str, data: Bytes) -> StorageResult<String>;

    /// Upload an object from a reader (for large files); returns the public URL.
    ///
    /// The reader is consumed until EOF. Callers are expected to have bounded
    /// the source already (staging enforces the size ceiling).
    async fn put_stream(
        &self,
        key: &str,
        content_type: &str,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String>;

    /// Download an object by its storage key
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Delete an object by its storage key
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if an object exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Public URL for a storage key
    fn url_for(&self, key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
