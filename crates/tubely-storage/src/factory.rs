use crate::{S3Storage, Storage, StorageError, StorageResult};
use std::sync::Arc;
use tubely_core::StorageConfig;

/// Create the object storage backend from configuration
pub fn create_storage(config: &StorageConfig) -> StorageResult<Arc<dyn Storage>> {
    if config.s3_bucket.trim().is_empty() {
        return Err(StorageError::ConfigError(
            "S3_BUCKET not configured".to_string(),
        ));
    }

    let storage = S3Storage::new(
        config.s3_bucket.clone(),
        config.s3_region.clone(),
        config.s3_endpoint.clone(),
        config.timeout,
    )?;

    tracing::info!(
        bucket = %config.s3_bucket,
        region = %config.s3_region,
        endpoint = ?config.s3_endpoint,
        "S3 storage initialized"
    );

    Ok(Arc::new(storage))
}
