//! Common utilities for file upload handlers

use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use futures::{Stream, TryStreamExt};
use tubely_core::AppError;
use tubely_processing::ProcessingError;
use uuid::Uuid;

/// Extra room above the file limit for multipart boundaries and part headers.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

pub fn parse_video_id(raw: &str) -> Result<Uuid, AppError> {
    Ok(Uuid::parse_str(raw)?)
}

/// Normalize MIME type by removing parameters (e.g., "video/mp4; codecs=avc1" -> "video/mp4")
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase()
}

/// Normalized content type if it is in `allowed`.
pub fn validate_content_type(
    content_type: Option<&str>,
    allowed: &[String],
    message: &str,
) -> Result<String, AppError> {
    let normalized = normalize_mime_type(content_type.unwrap_or_default());
    if normalized.is_empty() || !allowed.iter().any(|a| *a == normalized) {
        tracing::debug!(content_type = %normalized, "Rejected upload content type");
        return Err(AppError::UnsupportedMediaType(message.to_string()));
    }
    Ok(normalized)
}

/// `mp4` for `video/mp4`.
pub fn media_subtype(mime: &str) -> Result<&str, AppError> {
    match mime.split_once('/') {
        Some((_, subtype)) if !subtype.is_empty() => Ok(subtype),
        _ => Err(AppError::UnsupportedMediaType(format!(
            "Invalid media type: {}",
            mime
        ))),
    }
}

fn body_error(err: MultipartError, limit: u64) -> ProcessingError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ProcessingError::PayloadTooLarge { limit }
    } else {
        ProcessingError::BodyRead(err.body_text())
    }
}

/// Next part of the form, mapping body errors against `limit`.
pub async fn next_field(
    multipart: &mut Multipart,
    limit: u64,
) -> Result<Option<Field<'_>>, AppError> {
    multipart
        .next_field()
        .await
        .map_err(|e| AppError::from(body_error(e, limit)))
}

/// Error for a form that ended without the expected file part
pub fn missing_file() -> AppError {
    AppError::InvalidInput("Unable to parse form file".to_string())
}

/// Chunks of `field` as the staging area consumes them.
pub fn field_stream(
    field: Field<'_>,
    limit: u64,
) -> impl Stream<Item = Result<Bytes, ProcessingError>> + Send + '_ {
    field.map_err(move |e| body_error(e, limit))
}

/// Read `field` into memory, failing as soon as it exceeds `limit` bytes.
pub async fn read_field_limited(mut field: Field<'_>, limit: u64) -> Result<Bytes, AppError> {
    let mut data = BytesMut::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::from(body_error(e, limit)))?
    {
        if (data.len() + chunk.len()) as u64 > limit {
            return Err(ProcessingError::PayloadTooLarge { limit }.into());
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data.freeze())
}
