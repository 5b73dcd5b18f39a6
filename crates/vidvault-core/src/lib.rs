//! Vidvault Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration,
//! and identifier generation shared across all Vidvault components.

pub mod config;
pub mod error;
pub mod keygen;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
