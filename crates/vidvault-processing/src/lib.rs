//! Vidvault Processing Library
//!
//! The media ingestion pipeline: content negotiation, staging of inbound
//! byte streams, external-tool probing and fast-start remuxing, and the
//! orchestrator that sequences them against the metadata and object stores.

pub mod pipeline;
pub mod probe;
pub mod remux;
pub mod runner;
pub mod staging;
pub mod validator;

// Re-export commonly used types
pub use pipeline::{IngestStage, ThumbnailIngestPipeline, VideoIngestPipeline};
pub use probe::{ContainerProber, ContainerProfile, ProbeError};
pub use remux::{FastStartRemuxer, RemuxError};
pub use runner::{SubprocessRunner, TokioCommandRunner, ToolError, ToolOutput};
pub use staging::{StagedFile, StagingError};
pub use validator::ValidationError;
