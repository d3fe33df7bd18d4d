//! End-to-end flows through the assembled router
//!
//! Each test builds the full application over a temporary SQLite file and
//! drives it with `oneshot`, so no socket is opened.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use postboard_backend::{auth::JwtHandler, build_router, cors_layer, AppState, Database};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const SECRET: &str = "integration-secret";

struct TestApp {
    router: Router,
    _dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("postboard.db").to_str().unwrap()).unwrap();
        let state = AppState::new(db, JwtHandler::new(SECRET), 4);
        Self {
            router: build_router(state, cors_layer("http://localhost:5173")),
            _dir: dir,
        }
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn json(&self, method: &str, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn bare(&self, method: &str, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Sign up and log in; returns the token pair body.
    async fn register(&self, username: &str, email: &str, password: &str) -> Value {
        let (status, _) = self
            .json(
                "POST",
                "/auth/signup",
                None,
                json!({"username": username, "email": email, "password": password}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, tokens) = self
            .json(
                "POST",
                "/auth/login",
                None,
                json!({"email": email, "password": password}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        tokens
    }
}

#[tokio::test]
async fn signup_login_create_and_list() {
    let app = TestApp::new();

    let (status, body) = app
        .json(
            "POST",
            "/auth/signup",
            None,
            json!({"username": "bob", "email": "bob@example.com", "password": "secret1"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");

    let (status, tokens) = app
        .json(
            "POST",
            "/auth/login",
            None,
            json!({"email": "bob@example.com", "password": "secret1"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let access = tokens["access_token"].as_str().unwrap();
    assert!(tokens["refresh_token"].is_string());

    let (status, created) = app
        .json(
            "POST",
            "/posts/posts",
            Some(access),
            json!({"title": "Hello", "content": "First post"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let post_id = created["id"].as_str().unwrap().to_string();

    let (status, page) = app.bare("GET", "/posts/posts?page=1&limit=10", access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total_posts"], 1);
    assert_eq!(page["current_page"], 1);
    assert_eq!(page["total_pages"], 1);

    let post = &page["posts"][0];
    assert_eq!(post["id"], post_id.as_str());
    assert_eq!(post["title"], "Hello");
    assert_eq!(post["content"], "First post");

    let bob_id = JwtHandler::new(SECRET).verify_access(access).unwrap();
    assert_eq!(post["user_id"], bob_id.as_str());
}

#[tokio::test]
async fn refresh_issues_usable_access_token() {
    let app = TestApp::new();
    let tokens = app.register("carol", "carol@example.com", "secret1").await;
    let access = tokens["access_token"].as_str().unwrap();
    let refresh = tokens["refresh_token"].as_str().unwrap();

    let (status, body) = app.bare("POST", "/auth/refresh", refresh).await;
    assert_eq!(status, StatusCode::OK);
    let fresh = body["access_token"].as_str().unwrap();

    let (status, _) = app.bare("GET", "/posts/posts", fresh).await;
    assert_eq!(status, StatusCode::OK);

    // Token kinds are not interchangeable
    let (status, _) = app.bare("POST", "/auth/refresh", access).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.bare("GET", "/posts/posts", refresh).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn only_the_owner_may_change_a_post() {
    let app = TestApp::new();
    let owner = app.register("dave", "dave@example.com", "secret1").await;
    let other = app.register("erin", "erin@example.com", "secret1").await;
    let owner_access = owner["access_token"].as_str().unwrap();
    let other_access = other["access_token"].as_str().unwrap();

    let (_, created) = app
        .json(
            "POST",
            "/posts/posts",
            Some(owner_access),
            json!({"title": "Mine", "content": "Hands off"}),
        )
        .await;
    let uri = format!("/posts/posts/{}", created["id"].as_str().unwrap());

    let (status, body) = app
        .json("PUT", &uri, Some(other_access), json!({"title": "Taken"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You do not own this post");

    let (status, _) = app.bare("DELETE", &uri, other_access).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .json("PUT", &uri, Some(owner_access), json!({"title": "Still mine"}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, page) = app.bare("GET", "/posts/posts", other_access).await;
    assert_eq!(page["posts"][0]["title"], "Still mine");
    assert_eq!(page["posts"][0]["content"], "Hands off");

    let (status, _) = app.bare("DELETE", &uri, owner_access).await;
    assert_eq!(status, StatusCode::OK);

    let (_, page) = app.bare("GET", "/posts/posts", owner_access).await;
    assert_eq!(page["total_posts"], 0);
    assert_eq!(page["total_pages"], 0);
}

#[tokio::test]
async fn duplicate_email_and_bad_credentials() {
    let app = TestApp::new();
    app.register("frank", "frank@example.com", "secret1").await;

    let (status, body) = app
        .json(
            "POST",
            "/auth/signup",
            None,
            json!({"username": "franky", "email": "frank@example.com", "password": "secret2"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already exists");

    let (status, body) = app
        .json(
            "POST",
            "/auth/login",
            None,
            json!({"email": "frank@example.com", "password": "not-it"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");
}
