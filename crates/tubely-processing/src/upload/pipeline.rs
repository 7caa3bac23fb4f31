//! Video upload pipeline.
//!
//! One request runs the whole flow sequentially. The destination locator is added to the
//! record's pending set before the object is uploaded and promoted in a single write after, so
//! a stored object is always referenced by its video, as pending, confirmed or retired.
//! Concurrent uploads to one video each track their own pending entry.

use bytes::Bytes;
use futures::Stream;
use std::sync::Arc;
use tubely_core::{AppError, AspectRatio, StorageLocator, Video};
use tubely_storage::{name_key, Storage};

use super::record::VideoRecordUpdater;
use crate::error::ProcessingError;
use crate::staging::{StagedFile, StagingArea};
use crate::video::{FastStartRemuxer, MediaProber, VideoDimensions};

#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub video: Video,
    pub dimensions: VideoDimensions,
    pub aspect_ratio: AspectRatio,
    pub locator: StorageLocator,
}

#[derive(Clone)]
pub struct VideoUploadPipeline {
    staging: StagingArea,
    prober: MediaProber,
    remuxer: FastStartRemuxer,
    storage: Arc<dyn Storage>,
    records: VideoRecordUpdater,
}

impl VideoUploadPipeline {
    pub fn new(
        staging: StagingArea,
        prober: MediaProber,
        remuxer: FastStartRemuxer,
        storage: Arc<dyn Storage>,
        records: VideoRecordUpdater,
    ) -> Self {
        Self {
            staging,
            prober,
            remuxer,
            storage,
            records,
        }
    }

    /// Stage `body`, process it and attach the stored object to `video`.
    ///
    /// Staging is removed before this returns, whatever the outcome.
    #[tracing::instrument(skip(self, video, body), fields(video_id = %video.id))]
    pub async fn run<S>(
        &self,
        video: &Video,
        content_type: &str,
        media_subtype: &str,
        body: S,
        max_bytes: u64,
    ) -> Result<UploadOutcome, AppError>
    where
        S: Stream<Item = Result<Bytes, ProcessingError>> + Send,
    {
        let start = std::time::Instant::now();
        let staged = self
            .staging
            .stage(&format!("upload.{}", media_subtype), body, max_bytes)
            .await?;

        let result = self.process(video, &staged, content_type, media_subtype).await;

        if let Err(e) = staged.dispose().await {
            tracing::warn!(error = %e, video_id = %video.id, "Failed to remove staging directory");
        }

        match &result {
            Ok(outcome) => tracing::info!(
                video_id = %video.id,
                key = %outcome.locator.key,
                aspect_ratio = %outcome.aspect_ratio,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Video upload processed"
            ),
            Err(e) => tracing::warn!(
                video_id = %video.id,
                error = %e,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Video upload failed"
            ),
        }

        result
    }

    async fn process(
        &self,
        video: &Video,
        staged: &StagedFile,
        content_type: &str,
        media_subtype: &str,
    ) -> Result<UploadOutcome, AppError> {
        let dimensions = self.prober.probe(staged.path()).await?;
        let aspect_ratio = dimensions.aspect_ratio();

        let processed = self.remuxer.remux(staged).await?;

        let key = name_key(aspect_ratio, media_subtype)?;
        let locator = StorageLocator::new(self.storage.bucket(), key);

        self.records.mark_pending(video.id, locator.clone()).await?;

        if let Err(e) = self
            .storage
            .put_file(&locator, processed.path(), content_type)
            .await
        {
            if let Err(clear_err) = self.records.clear_pending(video.id, &locator).await {
                tracing::warn!(
                    error = %clear_err,
                    video_id = %video.id,
                    "Failed to clear pending locator; reconciliation will retry"
                );
            }
            return Err(e.into());
        }

        if let Err(e) = processed.dispose().await {
            tracing::warn!(error = %e, video_id = %video.id, "Failed to remove processed file");
        }

        let (video, replaced) = match self.records.attach_video(video.id, locator.clone()).await {
            Ok(attached) => attached,
            Err(e) => {
                if let Err(delete_err) = self.storage.delete(&locator).await {
                    tracing::error!(
                        error = %delete_err,
                        key = %locator.key,
                        "Failed to delete unreferenced object; left for reconciliation"
                    );
                }
                return Err(e);
            }
        };

        let video = match replaced {
            Some(old) => self.retire(video, &old).await,
            None => video,
        };

        Ok(UploadOutcome {
            video,
            dimensions,
            aspect_ratio,
            locator,
        })
    }

    /// Delete the object a re-upload replaced. Failures leave it retired for the sweep.
    async fn retire(&self, video: Video, old: &StorageLocator) -> Video {
        if let Err(e) = self.storage.delete(old).await {
            tracing::warn!(
                error = %e,
                video_id = %video.id,
                key = %old.key,
                "Failed to delete replaced object; left for reconciliation"
            );
            return video;
        }
        tracing::debug!(video_id = %video.id, key = %old.key, "Replaced object deleted");
        match self.records.forget_retired(video.id, old).await {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!(error = %e, video_id = %video.id, "Failed to forget retired locator");
                video
            }
        }
    }
}
