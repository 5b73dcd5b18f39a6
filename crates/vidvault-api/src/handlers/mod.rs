//! HTTP request handlers

pub mod health;
pub mod thumbnail_upload;
pub mod video_get;
pub mod video_upload;

pub use health::healthz;
pub use thumbnail_upload::upload_thumbnail;
pub use video_get::get_video;
pub use video_upload::upload_video;
