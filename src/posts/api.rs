//! Posts API Endpoints
//! Mission: Paginated listing and owner-gated CRUD for posts

use crate::app::AppState;
use crate::auth::{auth_middleware, middleware::AuthUser, JwtHandler};
use crate::error::ApiError;
use crate::posts::guard::authorize_owner;
use crate::posts::models::{CreatePostRequest, PostListResponse, UpdatePostRequest};
use crate::validation::{validate_new_post, validate_post_patch};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

/// Routes mounted under `/posts`; every one requires an access token.
pub fn router(jwt_handler: Arc<JwtHandler>) -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/:id", put(update_post).delete(delete_post))
        .route_layer(middleware::from_fn_with_state(jwt_handler, auth_middleware))
}

/// Raw paging parameters. Kept as strings so that non-numeric values fall
/// back to the defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

fn parse_u32(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
}

/// GET /posts/posts?page&limit
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let page = state.posts.list(
        parse_u32(query.page.as_deref()),
        parse_u32(query.limit.as_deref()),
    )?;
    Ok(Json(page.into()))
}

/// POST /posts/posts
pub async fn create_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(payload) = payload?;
    let new_post = validate_new_post(payload)?;

    let post = state
        .posts
        .create(&new_post.title, &new_post.content, &user.user_id)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Post created successfully", "id": post.id })),
    ))
}

/// PUT /posts/posts/:id
pub async fn update_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    // Existence and ownership come before the body is looked at
    let post = state.posts.get(&id)?.ok_or(ApiError::NotFound)?;
    authorize_owner(&post, &user.user_id).map_err(|_| {
        warn!("User {} tried to update post {} owned by {}", user.user_id, id, post.user_id);
        ApiError::Forbidden
    })?;

    let Json(payload) = payload?;
    let patch = validate_post_patch(payload)?;

    state.posts.update(&id, &user.user_id, &patch)?;

    Ok(Json(json!({ "message": "Post updated successfully" })))
}

/// DELETE /posts/posts/:id
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.posts.delete(&id, &user.user_id).map_err(|e| {
        warn!("Delete of post {} by {} refused: {}", id, user.user_id, e);
        ApiError::from(e)
    })?;

    Ok(Json(json!({ "message": "Post deleted successfully" })))
}
