//! Upload flow: stage → probe → remux → name → store → record.

mod pipeline;
mod reconcile;
mod record;

pub use pipeline::{UploadOutcome, VideoUploadPipeline};
pub use reconcile::{reconcile_pending_uploads, ReconcileReport};
pub use record::VideoRecordUpdater;
