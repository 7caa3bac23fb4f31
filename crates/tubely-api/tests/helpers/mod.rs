//! Test helpers: build AppState and router for integration tests.
//!
//! Everything runs in memory; ffprobe/ffmpeg are replaced by [`media::FakeMediaRunner`].
//! Run with `cargo test -p tubely-api`.

#![allow(dead_code)]

pub mod auth;
pub mod media;

use axum_test::TestServer;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::setup::routes;
use tubely_api::AppState;
use tubely_core::{Config, StorageConfig, Video};
use tubely_db::{InMemoryVideoRepository, VideoRepository};
use tubely_storage::{MemoryStorage, MemoryThumbnailStore};
use uuid::Uuid;

pub const TEST_BUCKET: &str = "tubely-test";
pub const TEST_BASE_URL: &str = "http://localhost:8091";

/// Test application: server plus handles on every in-memory backend.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub repository: InMemoryVideoRepository,
    pub storage: MemoryStorage,
    pub thumbnails: MemoryThumbnailStore,
    pub runner: Arc<media::FakeMediaRunner>,
    pub staging: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Entries left under the staging root.
    pub fn staged_entries(&self) -> usize {
        std::fs::read_dir(self.staging.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub async fn create_video(&self, owner: Uuid) -> Video {
        self.repository
            .create_video(Video::new(owner, "Boots demo", "A short clip"))
            .await
            .expect("create video")
    }

    pub async fn reload(&self, video_id: Uuid) -> Video {
        self.repository.get_video(video_id).await.expect("video exists")
    }
}

pub fn test_config(staging_dir: &Path) -> Config {
    let mut config = Config {
        jwt_secret: auth::TEST_JWT_SECRET.to_string(),
        public_base_url: TEST_BASE_URL.to_string(),
        storage: StorageConfig {
            s3_bucket: TEST_BUCKET.to_string(),
            ..Config::default().storage
        },
        reconcile_interval: None,
        ..Config::default()
    };
    config.media.staging_dir = staging_dir.to_path_buf();
    config
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Setup test app after letting the caller adjust its configuration.
pub async fn setup_test_app_with(adjust: impl FnOnce(&mut Config)) -> TestApp {
    let staging = TempDir::new().expect("staging root");
    let mut config = test_config(staging.path());
    adjust(&mut config);

    let repository = InMemoryVideoRepository::new();
    let storage = MemoryStorage::new(TEST_BUCKET);
    let thumbnails = MemoryThumbnailStore::new();
    let runner = Arc::new(media::FakeMediaRunner::default());

    let state = Arc::new(
        AppState::from_parts(
            config.clone(),
            Arc::new(repository.clone()),
            Arc::new(storage.clone()),
            Arc::new(thumbnails.clone()),
            runner.clone(),
        )
        .expect("app state"),
    );

    let router = routes::setup_routes(&config, state.clone()).expect("routes");
    let server = TestServer::new(router).expect("test server");

    TestApp {
        server,
        state,
        repository,
        storage,
        thumbnails,
        runner,
        staging,
    }
}
