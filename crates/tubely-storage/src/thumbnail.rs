//! Thumbnail store keyed by video id.
//!
//! A put replaces the whole entry atomically under the map's shard lock, so readers see
//! either the previous thumbnail or the new one, never a mix.

use dashmap::DashMap;
use std::sync::Arc;
use tubely_core::Thumbnail;
use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

pub trait ThumbnailStore: Send + Sync {
    /// Store a thumbnail, overwriting any previous one for the video
    fn put(&self, video_id: Uuid, thumbnail: Thumbnail);

    fn get(&self, video_id: Uuid) -> StorageResult<Thumbnail>;
}

/// Thumbnails held in a sharded concurrent map. Entries are never evicted.
#[derive(Clone, Default)]
pub struct MemoryThumbnailStore {
    entries: Arc<DashMap<Uuid, Thumbnail>>,
}

impl MemoryThumbnailStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ThumbnailStore for MemoryThumbnailStore {
    fn put(&self, video_id: Uuid, thumbnail: Thumbnail) {
        tracing::debug!(
            video_id = %video_id,
            media_type = %thumbnail.media_type,
            size_bytes = thumbnail.data.len(),
            "Thumbnail stored"
        );
        self.entries.insert(video_id, thumbnail);
    }

    fn get(&self, video_id: Uuid) -> StorageResult<Thumbnail> {
        self.entries
            .get(&video_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::NotFound(format!("Thumbnail not found for video {}", video_id)))
    }
}
