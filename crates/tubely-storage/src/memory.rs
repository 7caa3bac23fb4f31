//! In-process object store for local development and tests.
//!
//! Signed URLs carry the same expiry parameter an S3 presigned URL does, so callers can
//! reason about them without a network.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tubely_core::StorageLocator;

use crate::traits::{validate_key, Storage, StorageError, StorageResult};

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
}

#[derive(Clone)]
pub struct MemoryStorage {
    bucket: String,
    objects: Arc<DashMap<String, StoredObject>>,
}

impl MemoryStorage {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Arc::new(DashMap::new()),
        }
    }

    pub fn object(&self, locator: &StorageLocator) -> Option<StoredObject> {
        self.objects.get(&locator.key).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn check(&self, locator: &StorageLocator) -> StorageResult<()> {
        if locator.bucket != self.bucket {
            return Err(StorageError::InvalidLocator(format!(
                "bucket '{}' is not served by this store",
                locator.bucket
            )));
        }
        validate_key(&locator.key)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(
        &self,
        locator: &StorageLocator,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<()> {
        self.check(locator)?;
        tracing::debug!(key = %locator.key, size_bytes = data.len(), "Memory upload");
        self.objects.insert(
            locator.key.clone(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn sign(&self, locator: &StorageLocator, expires_in: Duration) -> StorageResult<String> {
        self.check(locator)?;
        Ok(format!(
            "memory://{}/{}?X-Amz-Date={}&X-Amz-Expires={}",
            self.bucket,
            locator.key,
            Utc::now().format("%Y%m%dT%H%M%SZ"),
            expires_in.as_secs()
        ))
    }

    async fn exists(&self, locator: &StorageLocator) -> StorageResult<bool> {
        self.check(locator)?;
        Ok(self.objects.contains_key(&locator.key))
    }

    async fn delete(&self, locator: &StorageLocator) -> StorageResult<()> {
        self.check(locator)?;
        self.objects.remove(&locator.key);
        Ok(())
    }
}
