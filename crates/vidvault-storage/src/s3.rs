use crate::traits::{ObjectStorage, StorageBackend, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::{
    Attribute, Attributes, Error as ObjectStoreError, ObjectStore, ObjectStoreExt,
    PutMultipartOptions, PutOptions, PutPayload, Result as ObjectResult, WriteMultipart,
};
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Read size for streaming uploads; parts are accumulated and shipped by
/// `WriteMultipart` at its own part granularity.
const STREAM_CHUNK_BYTES: usize = 1 << 20;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    /// Public base URL (CDN distribution) used for stored-object URLs when set.
    public_base_url: Option<String>,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `public_base_url` - Optional CDN base URL for public object URLs
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        public_base_url: Option<String>,
    ) -> StorageResult<Self> {
        // Build AmazonS3 object store from environment and explicit settings.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
            public_base_url,
        })
    }

    fn content_type_attributes(content_type: &str) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        attributes
    }

    fn content_type_options(content_type: &str) -> PutOptions {
        PutOptions {
            attributes: Self::content_type_attributes(content_type),
            ..Default::default()
        }
    }
}

/// Feed a reader into a multipart upload in bounded chunks, so a video near
/// the size ceiling never sits fully in memory. Returns the byte count.
async fn upload_reader(
    store: &dyn ObjectStore,
    location: &Path,
    opts: PutMultipartOptions,
    mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
) -> StorageResult<u64> {
    let upload = store
        .put_multipart_opts(location, opts)
        .await
        .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
    let mut writer = WriteMultipart::new(upload);

    let mut chunk = vec![0u8; STREAM_CHUNK_BYTES];
    let mut written: u64 = 0;
    loop {
        let bytes_read = match reader.read(&mut chunk).await {
            Ok(n) => n,
            Err(e) => {
                // Abandon any parts already shipped.
                let _ = writer.abort().await;
                return Err(StorageError::UploadFailed(format!(
                    "Failed to read from stream: {}",
                    e
                )));
            }
        };
        if bytes_read == 0 {
            break;
        }
        written += bytes_read as u64;
        writer.write(&chunk[..bytes_read]);
    }

    writer
        .finish()
        .await
        .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

    Ok(written)
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put(&self, key: &str, content_type: &str, data: Bytes) -> StorageResult<String> {
        let size = data.len() as u64;
        let location = Path::from(key.to_string());
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self
            .store
            .put_opts(
                &location,
                PutPayload::from(data),
                Self::content_type_options(content_type),
            )
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(self.url_for(key))
    }

    async fn put_stream(
        &self,
        key: &str,
        content_type: &str,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String> {
        let location = Path::from(key.to_string());
        let opts = PutMultipartOptions {
            attributes: Self::content_type_attributes(content_type),
            ..Default::default()
        };
        let start = std::time::Instant::now();

        let size = upload_reader(&self.store, &location, opts, reader)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    "S3 stream upload failed"
                );
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 stream upload successful"
        );

        Ok(self.url_for(key))
    }

    async fn download(&self, key: &str) -> StorageResult<Vec<u8>> {
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    "S3 download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                "S3 delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let location = Path::from(key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    /// Public URL for a stored object
    ///
    /// Prefers the CDN distribution when configured. For S3-compatible
    /// providers, constructs a path-style URL from the endpoint; otherwise
    /// uses the standard AWS S3 URL format.
    fn url_for(&self, key: &str) -> String {
        if let Some(ref base) = self.public_base_url {
            format!("{}/{}", base.trim_end_matches('/'), key)
        } else if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    #[tokio::test]
    async fn test_upload_reader_streams_without_full_buffering() {
        let store = InMemory::new();
        let location = Path::from("landscape/abc123.mp4");
        // Spans several read chunks so the loop is exercised, not just one pass.
        let payload: Vec<u8> = (0..3 * STREAM_CHUNK_BYTES).map(|i| (i % 251) as u8).collect();
        let reader: Pin<Box<dyn AsyncRead + Send + Unpin>> =
            Box::pin(std::io::Cursor::new(payload.clone()));

        let opts = PutMultipartOptions {
            attributes: S3Storage::content_type_attributes("video/mp4"),
            ..Default::default()
        };
        let written = upload_reader(&store, &location, opts, reader)
            .await
            .expect("upload");
        assert_eq!(written, payload.len() as u64);

        let result = store.get(&location).await.expect("get");
        assert_eq!(
            result
                .attributes
                .get(&Attribute::ContentType)
                .map(|v| v.as_ref()),
            Some("video/mp4")
        );
        let bytes = result.bytes().await.expect("bytes");
        assert_eq!(bytes.as_ref(), payload.as_slice());
    }

    #[tokio::test]
    async fn test_upload_reader_surfaces_read_failures() {
        let store = InMemory::new();
        let location = Path::from("portrait/broken.mp4");
        let reader: Pin<Box<dyn AsyncRead + Send + Unpin>> = Box::pin(FailingReader);

        let err = upload_reader(&store, &location, PutMultipartOptions::default(), reader)
            .await
            .expect_err("must fail");
        assert!(matches!(err, StorageError::UploadFailed(_)));
        // Nothing durable left behind.
        assert!(store.get(&location).await.is_err());
    }

    struct FailingReader;

    impl AsyncRead for FailingReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Err(std::io::Error::other("connection reset")))
        }
    }
}
