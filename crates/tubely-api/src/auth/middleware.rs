use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::auth::jwt::{extract_bearer_token, validate_token};
use crate::auth::models::AuthenticatedUser;
use crate::error::HttpAppError;
use crate::state::AppState;

/// Validates the bearer token and stores the caller in request extensions.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let user_id = match extract_bearer_token(request.headers())
        .and_then(|token| validate_token(token, &state.config.jwt_secret))
    {
        Ok(user_id) => user_id,
        Err(e) => return HttpAppError(e).into_response(),
    };

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id });

    next.run(request).await
}
