//! Authentication API Endpoints
//! Mission: Provide signup, login and token refresh endpoints

use crate::app::AppState;
use crate::auth::{
    middleware::bearer_token,
    models::{AccessTokenResponse, LoginRequest, SignupRequest, TokenPair},
    password::{hash_password, verify_password},
};
use crate::error::ApiError;
use crate::validation::validate_signup;
use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, warn};

/// Routes mounted under `/auth`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
}

/// Signup endpoint - POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(payload) = payload?;
    let new_user = validate_signup(payload)?;

    if state.users.get_user_by_email(&new_user.email)?.is_some() {
        warn!("Signup rejected, email already registered: {}", new_user.email);
        return Err(ApiError::DuplicateEmail);
    }

    let cost = state.password_cost;
    let password = new_user.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .context("Password hashing task failed")??;

    let user = state
        .users
        .create_user(&new_user.username, &new_user.email, &password_hash)?;

    info!("🔐 User registered: {} ({})", user.username, user.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

/// Login endpoint - POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenPair>, ApiError> {
    let Json(payload) = payload?;
    let email = payload.email.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    let Some(user) = state.users.get_user_by_email(&email)? else {
        warn!("❌ Failed login attempt for email: {}", email);
        return Err(ApiError::InvalidCredentials);
    };

    let stored_hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&stored_hash, &password))
        .await
        .context("Password verification task failed")?;

    if !valid {
        warn!("❌ Failed login attempt for email: {}", email);
        return Err(ApiError::InvalidCredentials);
    }

    let access_token = state.jwt.issue_access_token(&user.id)?;
    let refresh_token = state.jwt.issue_refresh_token(&user.id)?;

    info!("✅ User {} logged in successfully", user.id);

    Ok(Json(TokenPair {
        access_token,
        refresh_token,
    }))
}

/// Refresh endpoint - POST /auth/refresh with `Authorization: Bearer <refresh token>`
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    let token = bearer_token(&headers).ok_or(ApiError::Unauthenticated)?;

    let access_token = state.jwt.refresh(token).map_err(|e| {
        warn!("Refresh rejected: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(AccessTokenResponse { access_token }))
}
