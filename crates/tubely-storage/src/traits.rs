//! Storage abstraction trait
//!
//! This module defines the Storage trait that all object storage backends must implement.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tubely_core::{AppError, StorageLocator};

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Signing failed: {0}")]
    SignFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Storage {operation} timed out after {}s", timeout.as_secs())]
    TimedOut {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::TimedOut { operation, timeout } => {
                AppError::StorageTimedOut { operation, timeout }
            }
            StorageError::NotFound(what) => AppError::NotFound(what),
            StorageError::IoError(e) => AppError::Io(e),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Reject keys that could escape the bucket namespace or are empty.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("empty key".to_string()));
    }
    if key.starts_with('/') {
        return Err(StorageError::InvalidKey(format!("leading '/': {}", key)));
    }
    if key.split('/').any(|segment| segment == ".." || segment.is_empty()) {
        return Err(StorageError::InvalidKey(format!("invalid segment: {}", key)));
    }
    Ok(())
}

/// Storage abstraction trait
///
/// Every call addresses an object by a structured [`StorageLocator`]. None of the operations
/// retry; callers decide whether a failure is worth another attempt.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Bucket new objects are written to
    fn bucket(&self) -> &str;

    /// Upload bytes under the locator with the given content type
    async fn put(&self, locator: &StorageLocator, data: Bytes, content_type: &str)
        -> StorageResult<()>;

    /// Upload a file from disk, returning the number of bytes written.
    ///
    /// The default reads the whole file; backends that can stream should override it.
    async fn put_file(
        &self,
        locator: &StorageLocator,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<u64> {
        let data = tokio::fs::read(path).await?;
        let size = data.len() as u64;
        self.put(locator, Bytes::from(data), content_type).await?;
        Ok(size)
    }

    /// Produce a time-limited GET URL for the object
    async fn sign(&self, locator: &StorageLocator, expires_in: Duration) -> StorageResult<String>;

    /// Check if an object exists
    async fn exists(&self, locator: &StorageLocator) -> StorageResult<bool>;

    /// Delete an object
    async fn delete(&self, locator: &StorageLocator) -> StorageResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubely_core::ErrorMetadata;

    #[test]
    fn key_validation() {
        assert!(validate_key("landscape/abc.mp4").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/landscape/abc.mp4").is_err());
        assert!(validate_key("landscape/../secret").is_err());
        assert!(validate_key("landscape//abc.mp4").is_err());
    }

    #[test]
    fn timeouts_keep_their_flavor() {
        let err: AppError = StorageError::TimedOut {
            operation: "put",
            timeout: Duration::from_secs(600),
        }
        .into();
        assert_eq!(err.error_code(), "STORAGE_TIMEOUT");
        assert_eq!(err.http_status_code(), 400);

        let err: AppError = StorageError::UploadFailed("403".into()).into();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
    }
}
