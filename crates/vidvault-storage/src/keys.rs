//! Storage key scheme.
//!
//! Key construction is centralized here so all backends stay consistent:
//! videos land under their orientation bucket, thumbnails at the root.

use std::fmt::{Display, Formatter, Result as FmtResult};
use vidvault_core::models::Orientation;

use crate::traits::{StorageError, StorageResult};

/// The final addressable path for an asset in the durable store.
///
/// Immutable once computed; identifiers are never reused across assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey {
    prefix: Option<&'static str>,
    identifier: String,
    extension: String,
}

impl StorageKey {
    /// Key for a classified video: `{orientation}/{identifier}.{extension}`.
    pub fn for_video(
        orientation: Orientation,
        content_type: &str,
        identifier: String,
    ) -> StorageResult<Self> {
        Ok(StorageKey {
            prefix: Some(orientation.as_str()),
            identifier,
            extension: extension_for(content_type)?.to_string(),
        })
    }

    /// Key for a thumbnail: `{identifier}.{extension}`, no orientation bucket.
    pub fn for_thumbnail(content_type: &str, identifier: String) -> StorageResult<Self> {
        Ok(StorageKey {
            prefix: None,
            identifier,
            extension: extension_for(content_type)?.to_string(),
        })
    }

    /// Render the key as a storage path.
    pub fn as_path(&self) -> String {
        match self.prefix {
            Some(prefix) => format!("{}/{}.{}", prefix, self.identifier, self.extension),
            None => format!("{}.{}", self.identifier, self.extension),
        }
    }
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.as_path())
    }
}

/// Derive the file extension from a media type's subtype
/// (`video/mp4` -> `mp4`). Malformed types are rejected upstream by content
/// negotiation; this guards key construction anyway.
pub fn extension_for(content_type: &str) -> StorageResult<&str> {
    match content_type.split_once('/') {
        Some((kind, subtype)) if !kind.is_empty() && !subtype.is_empty() => Ok(subtype),
        _ => Err(StorageError::InvalidKey(format!(
            "malformed content type: {}",
            content_type
        ))),
    }
}
