use crate::traits::{validate_key, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::buffered::BufWriter;
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tubely_core::StorageLocator;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: Arc<AmazonS3>,
    bucket: String,
    timeout: Duration,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `timeout` - Deadline applied to every call against the store
    pub fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        timeout: Duration,
    ) -> StorageResult<Self> {
        // Credentials come from the standard AWS environment variables.
        let mut builder = AmazonS3Builder::from_env().with_region(region);

        if let Some(endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        Self::with_builder(builder, bucket, timeout)
    }

    /// Build from a preconfigured builder; the bucket name is applied here.
    pub fn with_builder(
        builder: AmazonS3Builder,
        bucket: String,
        timeout: Duration,
    ) -> StorageResult<Self> {
        let store = builder
            .with_bucket_name(bucket.clone())
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store: Arc::new(store),
            bucket,
            timeout,
        })
    }

    fn object_path(&self, locator: &StorageLocator) -> StorageResult<Path> {
        if locator.bucket != self.bucket {
            return Err(StorageError::InvalidLocator(format!(
                "bucket '{}' is not served by this store ('{}')",
                locator.bucket, self.bucket
            )));
        }
        validate_key(&locator.key)?;
        Path::parse(&locator.key).map_err(|e| StorageError::InvalidKey(e.to_string()))
    }

    async fn with_deadline<T, F>(&self, operation: &'static str, fut: F) -> StorageResult<T>
    where
        F: Future<Output = StorageResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    bucket = %self.bucket,
                    operation,
                    timeout_secs = self.timeout.as_secs(),
                    "S3 call timed out"
                );
                Err(StorageError::TimedOut {
                    operation,
                    timeout: self.timeout,
                })
            }
        }
    }

    fn content_type_attributes(content_type: &str) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        attributes
    }
}

#[async_trait]
impl Storage for S3Storage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    #[tracing::instrument(skip(self, locator, data), fields(key = %locator.key, size_bytes = data.len()))]
    async fn put(
        &self,
        locator: &StorageLocator,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<()> {
        let location = self.object_path(locator)?;
        let size = data.len() as u64;
        let start = std::time::Instant::now();
        let options = PutOptions {
            attributes: Self::content_type_attributes(content_type),
            ..Default::default()
        };

        self.with_deadline("put", async {
            let result: ObjectResult<_> = self
                .store
                .put_opts(&location, PutPayload::from(data), options)
                .await;
            result.map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %locator.key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })
        })
        .await?;

        tracing::info!(
            bucket = %self.bucket,
            key = %locator.key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    /// Streams the file through a multipart writer so large videos are never held in memory.
    #[tracing::instrument(skip(self, locator), fields(key = %locator.key))]
    async fn put_file(
        &self,
        locator: &StorageLocator,
        path: &std::path::Path,
        content_type: &str,
    ) -> StorageResult<u64> {
        let location = self.object_path(locator)?;
        let start = std::time::Instant::now();
        let store: Arc<dyn ObjectStore> = self.store.clone();

        let size = self
            .with_deadline("put", async {
                let mut file = tokio::fs::File::open(path).await?;
                let mut writer = BufWriter::new(store, location)
                    .with_attributes(Self::content_type_attributes(content_type));

                let copied = match tokio::io::copy(&mut file, &mut writer).await {
                    Ok(n) => n,
                    Err(e) => {
                        if let Err(abort_err) = writer.abort().await {
                            tracing::warn!(error = %abort_err, key = %locator.key, "Failed to abort S3 upload");
                        }
                        return Err(StorageError::UploadFailed(e.to_string()));
                    }
                };
                writer
                    .shutdown()
                    .await
                    .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
                Ok(copied)
            })
            .await
            .inspect_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %locator.key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 file upload failed"
                );
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %locator.key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 file upload successful"
        );

        Ok(size)
    }

    #[tracing::instrument(skip(self, locator), fields(key = %locator.key))]
    async fn sign(&self, locator: &StorageLocator, expires_in: Duration) -> StorageResult<String> {
        let location = self.object_path(locator)?;

        let url = self
            .with_deadline("sign", async {
                let url_result: ObjectResult<_> = self
                    .store
                    .signed_url(Method::GET, &location, expires_in)
                    .await;
                url_result.map_err(|e| StorageError::SignFailed(e.to_string()))
            })
            .await?;

        Ok(url.to_string())
    }

    async fn exists(&self, locator: &StorageLocator) -> StorageResult<bool> {
        let location = self.object_path(locator)?;
        self.with_deadline("head", async {
            match self.store.head(&location).await {
                Ok(_) => Ok(true),
                Err(ObjectStoreError::NotFound { .. }) => Ok(false),
                Err(e) => Err(StorageError::BackendError(e.to_string())),
            }
        })
        .await
    }

    async fn delete(&self, locator: &StorageLocator) -> StorageResult<()> {
        let location = self.object_path(locator)?;
        let start = std::time::Instant::now();

        self.with_deadline("delete", async {
            let result: ObjectResult<_> = self.store.delete(&location).await;
            result.map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %locator.key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                StorageError::DeleteFailed(e.to_string())
            })
        })
        .await?;

        tracing::info!(
            bucket = %self.bucket,
            key = %locator.key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }
}
