//! Staging of inbound upload streams onto local disk.
//!
//! External tools need a real file path, so every video upload is spooled
//! to a temp file before probing and remuxing. The size ceiling is enforced
//! during the copy, not after, so an oversized stream is cut off as soon as
//! it crosses the limit.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::path::Path;
use tempfile::TempPath;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use vidvault_core::AppError;

#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("upload exceeds the maximum allowed size of {max_bytes} bytes")]
    TooLarge { max_bytes: u64 },

    #[error("failed reading upload stream: {0}")]
    Stream(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<StagingError> for AppError {
    fn from(err: StagingError) -> Self {
        match err {
            StagingError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            StagingError::Stream(_) => AppError::InvalidInput(err.to_string()),
            StagingError::Io(_) => AppError::Internal(err.to_string()),
        }
    }
}

/// A fully spooled upload, rewound and ready for reading. The backing temp
/// file is deleted when the `StagedFile` is dropped.
#[derive(Debug)]
pub struct StagedFile {
    file: File,
    path: TempPath,
    len: u64,
}

impl StagedFile {
    /// Spool a byte stream to a fresh temp file, enforcing `max_bytes`.
    pub async fn from_stream<S, E>(mut stream: S, max_bytes: u64) -> Result<Self, StagingError>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Display,
    {
        let path = tempfile::Builder::new()
            .prefix("vidvault-upload")
            .tempfile()?
            .into_temp_path();

        // Read and write: consumers read the staged bytes back through this
        // same handle after the rewind, they do not reopen the path.
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .await?;
        let mut len: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| StagingError::Stream(e.to_string()))?;
            len += chunk.len() as u64;
            if len > max_bytes {
                return Err(StagingError::TooLarge { max_bytes });
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        file.sync_all().await?;
        file.rewind().await?;

        tracing::debug!(
            path = %path.display(),
            size_bytes = len,
            "upload staged to disk"
        );

        Ok(Self { file, path, len })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Split the staged file into its open handle and owning temp path.
    /// The path keeps the delete-on-drop behavior.
    pub fn into_parts(self) -> (File, TempPath) {
        (self.file, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    fn byte_stream(
        chunks: Vec<&'static [u8]>,
    ) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Unpin {
        futures::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok(Bytes::from_static(c)))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn test_spools_content_and_rewinds() {
        let staged = StagedFile::from_stream(byte_stream(vec![b"hello ", b"world"]), 1024)
            .await
            .expect("staging");
        assert_eq!(staged.len(), 11);

        let (mut file, _path) = staged.into_parts();
        let mut content = String::new();
        file.read_to_string(&mut content).await.expect("read back");
        assert_eq!(content, "hello world");
    }

    #[tokio::test]
    async fn test_staged_handle_is_readable_after_rewind() {
        let staged = StagedFile::from_stream(byte_stream(vec![b"thumbnail bytes"]), 1024)
            .await
            .expect("staging");

        // The handle itself must serve reads; a write-only handle would
        // fail here with EBADF even though the path is readable.
        let (mut file, _path) = staged.into_parts();
        let mut content = Vec::new();
        file.read_to_end(&mut content).await.expect("read staged bytes");
        assert_eq!(content, b"thumbnail bytes");
    }

    #[tokio::test]
    async fn test_oversized_stream_is_cut_off() {
        let err = StagedFile::from_stream(byte_stream(vec![b"0123456789", b"0123456789"]), 15)
            .await
            .expect_err("must reject");
        assert!(matches!(err, StagingError::TooLarge { max_bytes: 15 }));
    }

    #[tokio::test]
    async fn test_stream_error_is_surfaced() {
        let stream = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(std::io::Error::other("connection reset")),
        ]);
        let err = StagedFile::from_stream(stream, 1024)
            .await
            .expect_err("must fail");
        match err {
            StagingError::Stream(msg) => assert!(msg.contains("connection reset")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_temp_file_deleted_on_drop() {
        let staged = StagedFile::from_stream(byte_stream(vec![b"data"]), 1024)
            .await
            .expect("staging");
        let path = staged.path().to_path_buf();
        assert!(path.exists());
        drop(staged);
        assert!(!path.exists());
    }
}
