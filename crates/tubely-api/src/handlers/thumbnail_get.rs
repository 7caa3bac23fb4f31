use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;
use tubely_core::AppError;

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::parse_video_id;

/// Stored thumbnail bytes, served with their media type.
pub async fn get_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let thumbnail = state.thumbnails.get(video_id).map_err(AppError::from)?;

    Ok((
        [(header::CONTENT_TYPE, thumbnail.media_type)],
        thumbnail.data,
    ))
}
