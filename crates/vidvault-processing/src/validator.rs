//! Content negotiation for inbound uploads.
//!
//! Runs before any bytes are staged so rejected uploads cost no I/O.

use vidvault_core::AppError;

/// Content types accepted for thumbnail ingestion.
pub const THUMBNAIL_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Content types accepted for video ingestion.
pub const VIDEO_CONTENT_TYPES: &[&str] = &["video/mp4"];

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("unsupported media type: {content_type} (allowed: {allowed:?})")]
    UnsupportedMediaType {
        content_type: String,
        allowed: &'static [&'static str],
    },

    #[error("malformed content type: {0}")]
    MalformedContentType(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::UnsupportedMediaType(err.to_string())
    }
}

/// Parse a declared content type, discarding parameters (`; charset=...`),
/// and normalize to lowercase.
pub fn parse_media_type(raw: &str) -> Result<String, ValidationError> {
    let essence = raw
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.split_once('/') {
        Some((kind, subtype))
            if !kind.is_empty() && !subtype.is_empty() && !subtype.contains('/') =>
        {
            Ok(essence)
        }
        _ => Err(ValidationError::MalformedContentType(raw.to_string())),
    }
}

/// Accept a declared content type only if it is an exact member of the
/// allow-list. Returns the normalized media type.
pub fn negotiate(
    raw: &str,
    allowed: &'static [&'static str],
) -> Result<String, ValidationError> {
    let media_type = parse_media_type(raw)?;
    if allowed.contains(&media_type.as_str()) {
        Ok(media_type)
    } else {
        Err(ValidationError::UnsupportedMediaType {
            content_type: media_type,
            allowed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_are_ignored() {
        assert_eq!(
            negotiate("image/png; charset=binary", THUMBNAIL_CONTENT_TYPES).unwrap(),
            "image/png"
        );
        assert_eq!(
            negotiate("VIDEO/MP4", VIDEO_CONTENT_TYPES).unwrap(),
            "video/mp4"
        );
    }

    #[test]
    fn test_non_members_rejected() {
        for raw in ["application/pdf", "image/gif", "video/webm", "text/html"] {
            let err = negotiate(raw, VIDEO_CONTENT_TYPES).expect_err("must reject");
            assert!(matches!(err, ValidationError::UnsupportedMediaType { .. }));
        }
        // image types are not valid video types and vice versa
        assert!(negotiate("image/png", VIDEO_CONTENT_TYPES).is_err());
        assert!(negotiate("video/mp4", THUMBNAIL_CONTENT_TYPES).is_err());
    }

    #[test]
    fn test_malformed_rejected() {
        for raw in ["", "png", "image/", "/png", "image/png/extra"] {
            let err = negotiate(raw, THUMBNAIL_CONTENT_TYPES).expect_err("must reject");
            assert!(matches!(err, ValidationError::MalformedContentType(_)));
        }
    }
}
