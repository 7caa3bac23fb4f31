//! Sweep for uploads that were started but never confirmed.
//!
//! Retired objects, left behind when a re-upload could not delete the object it replaced,
//! are deleted on every pass. A pending locator is promoted when its object exists in the
//! store and cleared otherwise. Pending locators on records younger than `min_age` are
//! skipped so in-flight uploads are left alone.

use chrono::Utc;
use std::time::Duration;
use tubely_core::{AppError, StorageLocator, Video};
use tubely_db::VideoRepository;
use tubely_storage::Storage;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    pub promoted: usize,
    pub cleared: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// What one pass settled for a single video
#[derive(Debug, Default)]
struct Settled {
    deleted: Vec<StorageLocator>,
    found: Vec<StorageLocator>,
    missing: Vec<StorageLocator>,
}

impl Settled {
    fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.found.is_empty() && self.missing.is_empty()
    }

    /// Apply the outcome to the current record. The last stored pending object wins; any other
    /// stored one, and the locator it replaces, is retired for the next pass.
    fn apply(self, video: &mut Video) {
        video.retired_video_locators.retain(|l| !self.deleted.contains(l));
        video
            .pending_video_locators
            .retain(|l| !self.found.contains(l) && !self.missing.contains(l));

        let mut found = self.found;
        let Some(winner) = found.pop() else {
            return;
        };
        if let Some(previous) = video.video_locator.replace(winner) {
            found.push(previous);
        }
        for locator in found {
            if Some(&locator) != video.video_locator.as_ref()
                && !video.retired_video_locators.contains(&locator)
            {
                video.retired_video_locators.push(locator);
            }
        }
    }
}

pub async fn reconcile_pending_uploads(
    repository: &dyn VideoRepository,
    storage: &dyn Storage,
    min_age: Duration,
) -> Result<ReconcileReport, AppError> {
    let min_age = chrono::Duration::from_std(min_age).unwrap_or(chrono::Duration::MAX);
    let now = Utc::now();
    let mut report = ReconcileReport::default();

    for video in repository.list_pending_uploads().await? {
        let mut settled = Settled::default();

        for locator in &video.retired_video_locators {
            match storage.delete(locator).await {
                Ok(()) => settled.deleted.push(locator.clone()),
                Err(e) => {
                    tracing::warn!(error = %e, video_id = %video.id, key = %locator.key, "Failed to delete retired object");
                    report.failed += 1;
                }
            }
        }

        if !video.pending_video_locators.is_empty() {
            if now - video.updated_at < min_age {
                report.skipped += 1;
            } else {
                for locator in &video.pending_video_locators {
                    match storage.exists(locator).await {
                        Ok(true) => settled.found.push(locator.clone()),
                        Ok(false) => settled.missing.push(locator.clone()),
                        Err(e) => {
                            tracing::warn!(error = %e, video_id = %video.id, key = %locator.key, "Failed to check pending upload");
                            report.failed += 1;
                        }
                    }
                }
            }
        }

        if settled.is_empty() {
            continue;
        }

        let deleted = settled.deleted.len();
        let promoted = usize::from(!settled.found.is_empty());
        let cleared = settled.missing.len();
        match repository
            .update_video_with(video.id, Box::new(move |v: &mut Video| settled.apply(v)))
            .await
        {
            Ok(updated) => {
                tracing::info!(
                    video_id = %video.id,
                    deleted,
                    promoted,
                    cleared,
                    current = ?updated.video_locator.as_ref().map(|l| &l.key),
                    "Pending uploads reconciled"
                );
                report.deleted += deleted;
                report.promoted += promoted;
                report.cleared += cleared;
            }
            Err(e) => {
                tracing::warn!(error = %e, video_id = %video.id, "Failed to reconcile pending upload");
                report.failed += 1;
            }
        }
    }

    if report != ReconcileReport::default() {
        tracing::info!(
            promoted = report.promoted,
            cleared = report.cleared,
            deleted = report.deleted,
            skipped = report.skipped,
            failed = report.failed,
            "Pending upload reconciliation finished"
        );
    }

    Ok(report)
}
