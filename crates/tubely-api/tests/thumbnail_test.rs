//! Thumbnail upload and retrieval integration tests.
//!
//! Run with: `cargo test -p tubely-api --test thumbnail_test`

mod helpers;

use axum::http::StatusCode;
use helpers::auth::bearer;
use helpers::media::thumbnail_form;
use helpers::{setup_test_app, TEST_BASE_URL};
use serde_json::Value;
use tubely_core::VideoResponse;
use tubely_storage::ThumbnailStore;
use uuid::Uuid;

const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[tokio::test]
async fn png_thumbnail_is_stored_and_served() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.create_video(owner).await;

    let response = app
        .client()
        .post(&format!("/api/thumbnail_upload/{}", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(thumbnail_form(PNG_HEADER.to_vec(), "image/png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: VideoResponse = response.json();
    let expected_url = format!("{}/api/thumbnails/{}", TEST_BASE_URL, video.id);
    assert_eq!(body.thumbnail_url.as_deref(), Some(expected_url.as_str()));
    assert_eq!(
        app.reload(video.id).await.thumbnail_url.as_deref(),
        Some(expected_url.as_str())
    );

    let response = app
        .client()
        .get(&format!("/api/thumbnails/{}", video.id))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.header("content-type"), "image/png");
    assert_eq!(response.as_bytes().as_ref(), PNG_HEADER);
}

#[tokio::test]
async fn jpeg_replaces_previous_thumbnail() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.create_video(owner).await;
    let path = format!("/api/thumbnail_upload/{}", video.id);

    app.client()
        .post(&path)
        .add_header("Authorization", bearer(owner))
        .multipart(thumbnail_form(PNG_HEADER.to_vec(), "image/png"))
        .await;
    let response = app
        .client()
        .post(&path)
        .add_header("Authorization", bearer(owner))
        .multipart(thumbnail_form(vec![0xFF, 0xD8, 0xFF, 0xE0], "image/jpeg"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let stored = app.thumbnails.get(video.id).expect("thumbnail");
    assert_eq!(stored.media_type, "image/jpeg");
    assert_eq!(stored.data.as_ref(), &[0xFF, 0xD8, 0xFF, 0xE0]);
}

#[tokio::test]
async fn oversize_png_is_rejected_and_not_stored() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.create_video(owner).await;

    let limit = app.state.config.media.max_thumbnail_size_bytes as usize;
    let mut data = PNG_HEADER.to_vec();
    data.resize(limit + 1, 0);

    let response = app
        .client()
        .post(&format!("/api/thumbnail_upload/{}", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(thumbnail_form(data, "image/png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(app.thumbnails.is_empty());
    assert!(app.reload(video.id).await.thumbnail_url.is_none());
}

#[tokio::test]
async fn non_image_thumbnail_is_rejected() {
    let app = setup_test_app().await;
    let owner = Uuid::new_v4();
    let video = app.create_video(owner).await;

    let response = app
        .client()
        .post(&format!("/api/thumbnail_upload/{}", video.id))
        .add_header("Authorization", bearer(owner))
        .multipart(thumbnail_form(b"GIF89a".to_vec(), "image/gif"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid file type. Please upload a jpeg or png.");
    assert!(app.thumbnails.is_empty());
}

#[tokio::test]
async fn thumbnail_upload_requires_owner() {
    let app = setup_test_app().await;
    let video = app.create_video(Uuid::new_v4()).await;

    let response = app
        .client()
        .post(&format!("/api/thumbnail_upload/{}", video.id))
        .add_header("Authorization", bearer(Uuid::new_v4()))
        .multipart(thumbnail_form(PNG_HEADER.to_vec(), "image/png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert!(app.thumbnails.is_empty());
}

#[tokio::test]
async fn thumbnail_upload_requires_token() {
    let app = setup_test_app().await;
    let video = app.create_video(Uuid::new_v4()).await;

    let response = app
        .client()
        .post(&format!("/api/thumbnail_upload/{}", video.id))
        .multipart(thumbnail_form(PNG_HEADER.to_vec(), "image/png"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_thumbnail_is_not_found() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&format!("/api/thumbnails/{}", Uuid::new_v4()))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert!(body["error"].is_string());

    let response = app.client().get("/api/thumbnails/not-a-uuid").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn thumbnail_for_unknown_video_is_a_bad_request() {
    let app = setup_test_app().await;
    let id = Uuid::new_v4();

    let response = app
        .client()
        .post(&format!("/api/thumbnail_upload/{}", id))
        .add_header("Authorization", bearer(Uuid::new_v4()))
        .multipart(thumbnail_form(PNG_HEADER.to_vec(), "image/png"))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Unable to retrieve video metadata");
    assert!(app.thumbnails.get(id).is_err());
}
