use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tubely_core::{AppError, CreateVideoRequest, Video};

use crate::auth::models::AuthenticatedUser;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::parse_video_id;

/// Load a video and check that `user` owns it.
pub(crate) async fn owned_video(
    state: &AppState,
    user: &AuthenticatedUser,
    raw_id: &str,
) -> Result<Video, AppError> {
    let video_id = parse_video_id(raw_id)?;
    let video = state.repository.get_video(video_id).await?;
    if !video.is_owned_by(user.user_id) {
        tracing::debug!(video_id = %video_id, user_id = %user.user_id, "Video owned by another user");
        return Err(AppError::Forbidden("Unauthorized".to_string()));
    }
    Ok(video)
}

/// [`owned_video`] for the upload endpoints, where an unknown id is a bad request.
pub(crate) async fn upload_target(
    state: &AppState,
    user: &AuthenticatedUser,
    raw_id: &str,
) -> Result<Video, AppError> {
    owned_video(state, user, raw_id).await.map_err(|e| match e {
        AppError::NotFound(_) => {
            AppError::InvalidInput("Unable to retrieve video metadata".to_string())
        }
        other => other,
    })
}

#[tracing::instrument(skip(state, payload), fields(user_id = %user.user_id, operation = "create_video"))]
pub async fn create_video(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    payload: Result<Json<CreateVideoRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Json(request) = payload?;
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Title is required".to_string()).into());
    }

    let video = Video::new(user.user_id, title.to_string(), request.description);
    let video = state.repository.create_video(video).await.map_err(AppError::from)?;
    tracing::info!(video_id = %video.id, "Video created");

    let response = state.records.resolve(video).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id, operation = "list_videos"))]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let videos = state
        .repository
        .list_videos(user.user_id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(state.records.resolve_all(videos).await?))
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id, operation = "get_video"))]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video = owned_video(&state, &user, &video_id).await?;
    Ok(Json(state.records.resolve(video).await?))
}
