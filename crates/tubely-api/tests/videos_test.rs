//! Video record API integration tests.
//!
//! Run with: `cargo test -p tubely-api --test videos_test`

mod helpers;

use axum::http::StatusCode;
use helpers::auth::bearer;
use helpers::media::{fake_mp4, video_form};
use helpers::setup_test_app;
use serde_json::{json, Value};
use std::time::Duration;
use tubely_api::setup::reconcile::in_flight_window;
use tubely_core::VideoResponse;
use uuid::Uuid;

#[tokio::test]
async fn health_check_is_public() {
    let app = setup_test_app().await;
    let response = app.client().get("/api/healthz").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn create_and_list_videos() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();

    let response = app
        .client()
        .post("/api/videos")
        .add_header("Authorization", bearer(owner))
        .json(&json!({ "title": "Boots", "description": "A bear" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created: VideoResponse = response.json();
    assert_eq!(created.user_id, owner);
    assert!(created.video_url.is_none());
    assert!(created.thumbnail_url.is_none());

    app.create_video(Uuid::new_v4()).await;

    let response = app
        .client()
        .get("/api/videos")
        .add_header("Authorization", bearer(owner))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let listed: Vec<VideoResponse> = response.json();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .post("/api/videos")
        .add_header("Authorization", bearer(Uuid::new_v4()))
        .json(&json!({ "title": "   " }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_video_signs_a_fresh_url() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.create_video(owner).await;

    app.client()
        .post(&format!("/api/video_upload/{}", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(video_form(fake_mp4(1280, 720), "video/mp4"))
        .await;

    let response = app
        .client()
        .get(&format!("/api/videos/{}", video.id))
        .add_header("Authorization", bearer(owner))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: VideoResponse = response.json();
    let key = app.reload(video.id).await.video_locator.expect("locator").key;
    let url = body.video_url.expect("url");
    assert!(url.contains(&key));
    assert!(url.contains("X-Amz-Expires=900"));
}

#[tokio::test]
async fn get_video_of_another_user_is_unauthorized() {
    let app = setup_test_app().await;
    let video = app.create_video(Uuid::new_v4()).await;

    let response = app
        .client()
        .get(&format!("/api/videos/{}", video.id))
        .add_header("Authorization", bearer(Uuid::new_v4()))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let token = tubely_api::auth::issue_token(owner, helpers::auth::TEST_JWT_SECRET, Duration::ZERO)
        .expect("token");
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let response = app
        .client()
        .get("/api/videos")
        .add_header("Authorization", format!("Bearer {}", token))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn reconcile_window_covers_every_deadline() {
    let app = setup_test_app().await;
    let media = &app.state.config.media;
    let expected = media.probe_timeout + media.remux_timeout + app.state.config.storage.timeout;
    assert_eq!(in_flight_window(&app.state), expected);
}
