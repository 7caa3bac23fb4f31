use axum::{extract::FromRequestParts, http::request::Parts};
use tubely_core::AppError;
use uuid::Uuid;

use crate::error::HttpAppError;

/// Caller identity established by `auth_middleware`.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or_else(|| {
                HttpAppError(AppError::Unauthorized("Couldn't find JWT".to_string()))
            })
    }
}
