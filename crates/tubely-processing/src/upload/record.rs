use std::sync::Arc;
use std::time::Duration;
use tubely_core::{AppError, StorageLocator, Video, VideoResponse};
use tubely_db::VideoRepository;
use tubely_storage::Storage;
use uuid::Uuid;

/// Writes locators onto video records and turns them into signed URLs on read.
#[derive(Clone)]
pub struct VideoRecordUpdater {
    repository: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    signed_url_ttl: Duration,
}

impl VideoRecordUpdater {
    pub fn new(
        repository: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        signed_url_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            storage,
            signed_url_ttl,
        }
    }

    async fn modify<'a, F>(&self, video_id: Uuid, change: F) -> Result<Video, AppError>
    where
        F: FnOnce(&mut Video) + Send + 'a,
    {
        self.repository
            .update_video_with(video_id, Box::new(change))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, video_id = %video_id, "Failed to update video record");
                AppError::from(e)
            })
    }

    /// Record an upload that has started but not yet been confirmed.
    pub async fn mark_pending(
        &self,
        video_id: Uuid,
        locator: StorageLocator,
    ) -> Result<Video, AppError> {
        self.modify(video_id, |video: &mut Video| {
            if !video.pending_video_locators.contains(&locator) {
                video.pending_video_locators.push(locator);
            }
        })
        .await
    }

    /// Drop `locator` from the pending set, leaving other uploads' entries alone.
    pub async fn clear_pending(
        &self,
        video_id: Uuid,
        locator: &StorageLocator,
    ) -> Result<Video, AppError> {
        self.modify(video_id, |video: &mut Video| {
            video.pending_video_locators.retain(|l| l != locator)
        })
        .await
    }

    /// Point the video at an uploaded object, confirming its pending entry in the same write.
    ///
    /// The replaced locator, if any, is moved to the retired set and returned so the caller
    /// can delete its object.
    pub async fn attach_video(
        &self,
        video_id: Uuid,
        locator: StorageLocator,
    ) -> Result<(Video, Option<StorageLocator>), AppError> {
        let mut replaced = None;
        let video = self
            .modify(video_id, |video: &mut Video| {
                video.pending_video_locators.retain(|l| *l != locator);
                if let Some(previous) = video.video_locator.replace(locator) {
                    if Some(&previous) != video.video_locator.as_ref() {
                        video.retired_video_locators.push(previous.clone());
                        replaced = Some(previous);
                    }
                }
            })
            .await?;
        tracing::info!(video_id = %video_id, "Video locator attached");
        Ok((video, replaced))
    }

    /// Forget a retired locator once its object has been deleted.
    pub async fn forget_retired(
        &self,
        video_id: Uuid,
        locator: &StorageLocator,
    ) -> Result<Video, AppError> {
        self.modify(video_id, |video: &mut Video| {
            video.retired_video_locators.retain(|l| l != locator)
        })
        .await
    }

    pub async fn attach_thumbnail(&self, video_id: Uuid, url: String) -> Result<Video, AppError> {
        self.modify(video_id, |video: &mut Video| video.thumbnail_url = Some(url))
            .await
    }

    /// Client view of a video with a freshly signed URL in place of the stored locator.
    pub async fn resolve(&self, video: Video) -> Result<VideoResponse, AppError> {
        let video_url = match &video.video_locator {
            Some(locator) => Some(self.storage.sign(locator, self.signed_url_ttl).await?),
            None => None,
        };
        Ok(VideoResponse::from_video(video, video_url))
    }

    pub async fn resolve_all(&self, videos: Vec<Video>) -> Result<Vec<VideoResponse>, AppError> {
        let mut resolved = Vec::with_capacity(videos.len());
        for video in videos {
            resolved.push(self.resolve(video).await?);
        }
        Ok(resolved)
    }
}
