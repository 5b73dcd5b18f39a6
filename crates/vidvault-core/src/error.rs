//! Error types module
//!
//! This module provides the core error types used throughout the Vidvault
//! application. All errors are unified under the `AppError` enum, which maps
//! every stage of the ingestion pipeline (validation, staging, probing,
//! remuxing, upload, persistence) onto a single taxonomy the HTTP layer can
//! render consistently.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like resource limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "PROBE_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Metadata store error: {0}")]
    Database(String),

    #[error("Object storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Container probe failed: {0}")]
    Probe(String),

    #[error("Fast-start remux failed: {0}")]
    Remux(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// Reduces duplication in the ErrorMetadata impl; client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "PERSISTENCE_FAILED",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Storage(_) => (
            500,
            "UPLOAD_FAILED",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsupportedMediaType(_) => (
            415,
            "UNSUPPORTED_MEDIA_TYPE",
            false,
            Some("Upload a supported media type"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size and retry"),
            false,
            LogLevel::Debug,
        ),
        AppError::Probe(_) => (
            500,
            "PROBE_FAILED",
            false,
            Some("Check that the file is a valid video and retry"),
            true,
            LogLevel::Error,
        ),
        AppError::Remux(_) => (
            500,
            "REMUX_FAILED",
            false,
            Some("Check that the file is a valid video and retry"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Check the bearer token"),
            false,
            LogLevel::Debug,
        ),
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            // Sensitive variants get a generic client message; the detailed
            // message is kept for logs and non-production responses.
            AppError::Database(_) => "Failed to persist media metadata".to_string(),
            AppError::Storage(_) => "Failed to store media".to_string(),
            AppError::Probe(_) => "Failed to inspect the uploaded video".to_string(),
            AppError::Remux(_) => "Failed to process the uploaded video".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl AppError {
    /// Full internal message, for logs and non-production error bodies.
    pub fn detailed_message(&self) -> String {
        match self {
            AppError::InternalWithSource { message, source } => {
                format!("{}: {}", message, source)
            }
            other => other.to_string(),
        }
    }

    /// Variant name, for structured log fields.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::UnsupportedMediaType(_) => "UnsupportedMediaType",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Probe(_) => "Probe",
            AppError::Remux(_) => "Remux",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
            AppError::Unauthorized(_) => "Unauthorized",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(AppError::InvalidInput("x".into()).http_status_code(), 400);
        assert_eq!(AppError::Unauthorized("x".into()).http_status_code(), 401);
        assert_eq!(AppError::NotFound("x".into()).http_status_code(), 404);
        assert_eq!(
            AppError::PayloadTooLarge("x".into()).http_status_code(),
            413
        );
        assert_eq!(
            AppError::UnsupportedMediaType("x".into()).http_status_code(),
            415
        );
        assert_eq!(AppError::Probe("x".into()).http_status_code(), 500);
        assert_eq!(AppError::Remux("x".into()).http_status_code(), 500);
        assert_eq!(AppError::Storage("x".into()).http_status_code(), 500);
        assert_eq!(AppError::Database("x".into()).http_status_code(), 500);
    }

    #[test]
    fn test_sensitive_errors_hide_details_from_client() {
        let err = AppError::Probe("ffprobe stderr: moov atom not found".into());
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("moov atom"));
        assert!(err.detailed_message().contains("moov atom"));
    }

    #[test]
    fn test_client_errors_keep_their_message() {
        let err = AppError::UnsupportedMediaType("application/pdf".into());
        assert!(!err.is_sensitive());
        assert!(err.client_message().contains("application/pdf"));
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::other("disk full");
        let err: AppError = io_err.into();
        match err {
            AppError::Internal(msg) => assert!(msg.contains("disk full")),
            _ => panic!("Expected Internal variant"),
        }
    }
}
