//! Vidvault Storage Library
//!
//! Durable object storage for ingested media: the `ObjectStorage` trait, an
//! S3 backend for videos, a local-filesystem backend for thumbnails, and the
//! storage key scheme.
//!
//! # Storage key format
//!
//! - **Videos**: `{orientation}/{identifier}.{extension}` where orientation
//!   is the probed `landscape`/`portrait`/`other` bucket
//! - **Thumbnails**: `{identifier}.{extension}` (no orientation bucket)
//!
//! Keys must not contain `..` or a leading `/`. Key construction is
//! centralized in the `keys` module so all backends stay consistent.

pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use keys::StorageKey;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ObjectStorage, StorageBackend, StorageError, StorageResult};
