//! Application setup and initialization

pub mod reconcile;
pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::InMemoryVideoRepository;
use tubely_processing::TokioCommandRunner;
use tubely_storage::{create_storage, MemoryThumbnailStore};

/// Build the state and router for a production process.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    tokio::fs::create_dir_all(&config.media.staging_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create staging directory {}",
                config.media.staging_dir.display()
            )
        })?;

    let storage = create_storage(&config.storage).context("Failed to configure object storage")?;
    tracing::info!(bucket = %config.storage.s3_bucket, region = %config.storage.s3_region, "Object storage configured");

    let state = Arc::new(AppState::from_parts(
        config.clone(),
        Arc::new(InMemoryVideoRepository::new()),
        storage,
        Arc::new(MemoryThumbnailStore::new()),
        Arc::new(TokioCommandRunner),
    )?);

    if let Some(interval) = config.reconcile_interval {
        reconcile::spawn_reconciler(state.clone(), interval);
    }

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
