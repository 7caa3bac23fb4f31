use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tubely_core::{AppError, Thumbnail};

use crate::auth::models::AuthenticatedUser;
use crate::error::HttpAppError;
use crate::handlers::videos::upload_target;
use crate::state::AppState;
use crate::utils::upload::{missing_file, next_field, read_field_limited, validate_content_type};

const THUMBNAIL_FIELD: &str = "thumbnail";

#[tracing::instrument(
    skip(state, multipart),
    fields(user_id = %user.user_id, video_id = %video_id, operation = "upload_thumbnail")
)]
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(video_id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let video = upload_target(&state, &user, &video_id).await?;

    let media = &state.config.media;
    let limit = media.max_thumbnail_size_bytes;

    while let Some(field) = next_field(&mut multipart, limit).await? {
        if field.name() != Some(THUMBNAIL_FIELD) {
            continue;
        }

        let media_type = validate_content_type(
            field.content_type(),
            &media.thumbnail_allowed_content_types,
            "Invalid file type. Please upload a jpeg or png.",
        )?;
        let data = read_field_limited(field, limit).await?;
        if data.is_empty() {
            return Err(AppError::InvalidInput("Thumbnail is empty".to_string()).into());
        }

        let size = data.len();
        state.thumbnails.put(video.id, Thumbnail::new(data, media_type));

        let video = state
            .records
            .attach_thumbnail(video.id, state.thumbnail_url(video.id))
            .await?;
        tracing::info!(size_bytes = size, "Thumbnail stored");

        return Ok(Json(state.records.resolve(video).await?));
    }

    Err(missing_file().into())
}
