use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::auth::models::AuthenticatedUser;
use crate::error::HttpAppError;
use crate::handlers::videos::upload_target;
use crate::state::AppState;
use crate::utils::upload::{
    field_stream, media_subtype, missing_file, next_field, validate_content_type,
};

const VIDEO_FIELD: &str = "video";

/// Accept an mp4 for an existing video, fast-start it and store it.
///
/// Ownership is checked before any of the body is read.
#[tracing::instrument(
    skip(state, multipart),
    fields(user_id = %user.user_id, video_id = %video_id, operation = "upload_video")
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(video_id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let video = upload_target(&state, &user, &video_id).await?;

    let media = &state.config.media;
    let limit = media.max_video_size_bytes;

    // Fields before the video part are skipped unread.
    while let Some(field) = next_field(&mut multipart, limit).await? {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let content_type = validate_content_type(
            field.content_type(),
            &media.video_allowed_content_types,
            "Invalid file type. Please upload an mp4.",
        )?;
        let subtype = media_subtype(&content_type)?.to_string();

        tracing::info!(content_type = %content_type, "Uploading video");

        let outcome = state
            .pipeline
            .run(&video, &content_type, &subtype, field_stream(field, limit), limit)
            .await?;

        let response = state.records.resolve(outcome.video).await?;
        return Ok(Json(response));
    }

    Err(missing_file().into())
}
