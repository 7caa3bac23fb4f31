//! Periodic sweep of unconfirmed uploads and replaced objects

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tubely_processing::{reconcile_pending_uploads, ReconcileReport};

use crate::state::AppState;

/// Age after which a pending upload can no longer be in flight.
pub fn in_flight_window(state: &AppState) -> Duration {
    let media = &state.config.media;
    media.probe_timeout + media.remux_timeout + state.config.storage.timeout
}

pub fn spawn_reconciler(state: Arc<AppState>, interval: Duration) -> JoinHandle<()> {
    let min_age = in_flight_window(&state);
    tracing::info!(
        interval_secs = interval.as_secs(),
        min_age_secs = min_age.as_secs(),
        "Starting pending upload reconciler"
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match reconcile_pending_uploads(&*state.repository, &*state.storage, min_age).await {
                Ok(report) if report == ReconcileReport::default() => {}
                Ok(report) => tracing::info!(
                    promoted = report.promoted,
                    cleared = report.cleared,
                    deleted = report.deleted,
                    skipped = report.skipped,
                    failed = report.failed,
                    "Reconciled pending uploads"
                ),
                Err(e) => tracing::error!(error = %e, "Pending upload sweep failed"),
            }
        }
    })
}
