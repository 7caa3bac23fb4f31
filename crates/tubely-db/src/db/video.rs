use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tubely_core::Video;
use uuid::Uuid;

use super::error::{RepositoryError, RepositoryResult};

/// In-place change applied to a stored video under the registry's write lock.
pub type VideoChange<'a> = Box<dyn FnOnce(&mut Video) + Send + 'a>;

/// Trait for video registry operations
/// This abstracts the registry's storage engine
#[async_trait::async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create_video(&self, video: Video) -> RepositoryResult<Video>;

    async fn get_video(&self, id: Uuid) -> RepositoryResult<Video>;

    async fn list_videos(&self, user_id: Uuid) -> RepositoryResult<Vec<Video>>;

    /// Apply `change` to the current record atomically and return the result.
    ///
    /// Fails with `NotFound` when the id is unknown. Concurrent writers to the same video
    /// never lose each other's changes.
    async fn update_video_with(&self, id: Uuid, change: VideoChange<'_>) -> RepositoryResult<Video>;

    /// Videos with pending uploads or retired objects left to settle
    async fn list_pending_uploads(&self) -> RepositoryResult<Vec<Video>>;
}

/// Registry held in a sharded concurrent map
#[derive(Clone, Default)]
pub struct InMemoryVideoRepository {
    videos: Arc<DashMap<Uuid, Video>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create_video(&self, video: Video) -> RepositoryResult<Video> {
        self.videos.insert(video.id, video.clone());
        tracing::debug!(video_id = %video.id, user_id = %video.user_id, "Video created");
        Ok(video)
    }

    async fn get_video(&self, id: Uuid) -> RepositoryResult<Video> {
        self.videos
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn list_videos(&self, user_id: Uuid) -> RepositoryResult<Vec<Video>> {
        let mut videos: Vec<Video> = self
            .videos
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }

    async fn update_video_with(&self, id: Uuid, change: VideoChange<'_>) -> RepositoryResult<Video> {
        let mut entry = self.videos.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        change(entry.value_mut());
        entry.updated_at = Utc::now();
        Ok(entry.value().clone())
    }

    async fn list_pending_uploads(&self) -> RepositoryResult<Vec<Video>> {
        Ok(self
            .videos
            .iter()
            .filter(|entry| entry.has_unsettled_uploads())
            .map(|entry| entry.value().clone())
            .collect())
    }
}
