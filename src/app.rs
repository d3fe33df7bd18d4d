//! Application wiring
//!
//! `AppState` is built once at startup and handed to every handler through
//! axum's `State`; there is no global state.

use crate::auth::{self, JwtHandler, UserStore};
use crate::db::Database;
use crate::middleware::request_logging;
use crate::posts::{self, PostStore};
use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, warn};

/// Shared handles injected into every request handler
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub users: Arc<UserStore>,
    pub posts: Arc<PostStore>,
    pub jwt: Arc<JwtHandler>,
    pub password_cost: u32,
}

impl AppState {
    pub fn new(db: Database, jwt: JwtHandler, password_cost: u32) -> Self {
        Self {
            users: Arc::new(UserStore::new(db.clone())),
            posts: Arc::new(PostStore::new(db.clone())),
            jwt: Arc::new(jwt),
            db,
            password_cost,
        }
    }
}

/// Assemble the full HTTP surface.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/check-db", get(check_db))
        .nest("/auth", auth::api::router())
        .nest("/posts", posts::api::router(state.jwt.clone()))
        .with_state(state)
        .layer(middleware::from_fn(request_logging))
        .layer(cors)
}

/// CORS policy for the configured frontend origin. `*` allows any origin
/// without credentials.
pub fn cors_layer(origin: &str) -> CorsLayer {
    if origin.trim() == "*" {
        return CorsLayer::permissive();
    }

    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(origin.trim()) {
        Ok(value) => base.allow_origin(value),
        Err(e) => {
            warn!("Ignoring unusable CORS origin {:?}: {}", origin, e);
            base
        }
    }
}

async fn home() -> &'static str {
    "🚀 Postboard backend is running"
}

async fn check_db(State(state): State<AppState>) -> (StatusCode, String) {
    match state.db.ping() {
        Ok(()) => (StatusCode::OK, "Database is connected!".to_string()),
        Err(e) => {
            error!("Database connection error: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database connection error: {}", e),
            )
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    /// In-memory state with the cheapest bcrypt cost
    pub fn test_state() -> AppState {
        AppState::new(
            Database::in_memory().unwrap(),
            JwtHandler::new("test-secret-key-12345"),
            4,
        )
    }

    /// Drive one request through a router and decode the JSON body
    /// (`Value::Null` for non-JSON bodies).
    pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }
}
