//! Tubely upload processing
//!
//! Stages uploaded bytes on disk, probes and remuxes them with ffprobe/ffmpeg, uploads the
//! result to object storage and keeps the video record in step with what was stored.

pub mod command;
pub mod error;
pub mod staging;
pub mod upload;
pub mod video;

#[cfg(test)]
pub(crate) mod test_support;

pub use command::{validate_tool_path, CommandOutput, CommandRunner, TokioCommandRunner};
pub use error::{ProcessingError, ProcessingResult};
pub use staging::{ProcessedFile, StagedFile, StagingArea};
pub use upload::{
    reconcile_pending_uploads, ReconcileReport, UploadOutcome, VideoRecordUpdater,
    VideoUploadPipeline,
};
pub use video::{FastStartRemuxer, MediaProber, VideoDimensions};
