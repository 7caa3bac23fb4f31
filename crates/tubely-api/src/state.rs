//! Shared application state

use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::{
    CommandRunner, FastStartRemuxer, MediaProber, StagingArea, VideoRecordUpdater,
    VideoUploadPipeline,
};
use tubely_storage::{Storage, ThumbnailStore};

pub struct AppState {
    pub config: Config,
    pub repository: Arc<dyn VideoRepository>,
    pub storage: Arc<dyn Storage>,
    pub thumbnails: Arc<dyn ThumbnailStore>,
    pub records: VideoRecordUpdater,
    pub pipeline: VideoUploadPipeline,
}

impl AppState {
    /// Wire the upload pipeline from its collaborators.
    ///
    /// Fails when the configured ffprobe/ffmpeg paths are rejected.
    pub fn from_parts(
        config: Config,
        repository: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        thumbnails: Arc<dyn ThumbnailStore>,
        runner: Arc<dyn CommandRunner>,
    ) -> anyhow::Result<Self> {
        let media = &config.media;
        let records = VideoRecordUpdater::new(
            repository.clone(),
            storage.clone(),
            config.storage.signed_url_ttl,
        );
        let prober = MediaProber::new(
            runner.clone(),
            media.ffprobe_path.clone(),
            media.probe_timeout,
        )?;
        let remuxer = FastStartRemuxer::new(runner, media.ffmpeg_path.clone(), media.remux_timeout)?;
        let pipeline = VideoUploadPipeline::new(
            StagingArea::new(media.staging_dir.clone()),
            prober,
            remuxer,
            storage.clone(),
            records.clone(),
        );

        Ok(Self {
            config,
            repository,
            storage,
            thumbnails,
            records,
            pipeline,
        })
    }

    /// URL under which the thumbnail of `video_id` is served.
    pub fn thumbnail_url(&self, video_id: uuid::Uuid) -> String {
        format!(
            "{}/api/thumbnails/{}",
            self.config.public_base_url.trim_end_matches('/'),
            video_id
        )
    }
}
