//! Authentication Middleware
//! Mission: Protect post endpoints with access-token validation

use crate::auth::jwt::JwtHandler;
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

/// Identity established by a verified access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
}

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Auth middleware that validates access tokens and injects `AuthUser`
pub async fn auth_middleware(
    State(jwt_handler): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).ok_or(ApiError::Unauthenticated)?;

    let user_id = jwt_handler.verify_access(token).map_err(|e| {
        debug!("Rejected access token on {}: {}", req.uri().path(), e);
        ApiError::from(e)
    })?;

    // Handlers read this back with `Extension<AuthUser>`
    req.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(req).await)
}
