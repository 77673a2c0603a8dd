#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use quizplay_api::{
    config::Config,
    create_router,
    middlewares::auth::{JwtClaims, JwtService},
    models::User,
    services::{random_play_service::OffsetPicker, AppState},
    storage::memory::MemoryStore,
};

pub const JWT_SECRET: &str = "integration-test-secret";

pub const ALICE: &str = "65f000000000000000000a11";
pub const BOB: &str = "65f000000000000000000b0b";
pub const ADMIN: &str = "65f000000000000000000adb";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

pub async fn create_test_app() -> TestApp {
    build_app(None).await
}

/// Same app, but random play draws offsets from `picker`.
pub async fn create_test_app_with_picker(picker: Arc<dyn OffsetPicker>) -> TestApp {
    build_app(Some(picker)).await
}

async fn build_app(picker: Option<Arc<dyn OffsetPicker>>) -> TestApp {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let store = Arc::new(MemoryStore::new());
    seed_users(&store).await;

    let mut config = Config::in_memory(JWT_SECRET);
    config.quizzes_per_page = 3;

    let mut state = AppState::in_memory(config, store.clone());
    if let Some(picker) = picker {
        state = state.with_offset_picker(picker);
    }

    TestApp {
        router: create_router(Arc::new(state)),
        store,
    }
}

async fn seed_users(store: &MemoryStore) {
    for (id, username) in [(ALICE, "alice"), (BOB, "bob"), (ADMIN, "root")] {
        store
            .put_user(User {
                id: id.to_string(),
                username: username.to_string(),
            })
            .await;
    }
}

pub fn token_for(user_id: &str) -> String {
    let (username, role) = match user_id {
        ALICE => ("alice", "user"),
        BOB => ("bob", "user"),
        ADMIN => ("root", "admin"),
        _ => ("stranger", "user"),
    };
    let claims = JwtClaims::new(user_id, username, role, chrono::Duration::hours(1));
    JwtService::new(JWT_SECRET)
        .generate_token(&claims)
        .expect("token")
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: serde_json::Value,
}

impl TestResponse {
    /// Value of a cookie set by this response.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| key.trim() == name)
            .map(|(_, value)| value.to_string())
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body)
            .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&body).into()))
    };

    TestResponse {
        status,
        headers,
        json,
    }
}

pub async fn get(router: &Router, uri: &str) -> TestResponse {
    send(
        router,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

pub async fn get_as(router: &Router, uri: &str, user_id: &str) -> TestResponse {
    send(
        router,
        Request::builder()
            .uri(uri)
            .header("authorization", format!("Bearer {}", token_for(user_id)))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

/// GET with the given cookie header, as a browser replaying its jar.
pub async fn get_with_cookie(router: &Router, uri: &str, cookie: Option<&str>) -> TestResponse {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    send(router, builder.body(Body::empty()).unwrap()).await
}

pub async fn get_csrf_token(router: &Router) -> (String, String) {
    let response = get(router, "/api/v1/auth/csrf-token").await;
    assert_eq!(response.status, StatusCode::OK);
    let token = response.json["csrf_token"].as_str().unwrap().to_string();
    let cookie = response.cookie("csrf_token").unwrap();
    (token, cookie)
}

/// State-changing request with bearer token and CSRF pair.
pub async fn mutate_as(
    router: &Router,
    method: &str,
    uri: &str,
    user_id: &str,
    body: Option<serde_json::Value>,
) -> TestResponse {
    mutate_with_token(router, method, uri, &token_for(user_id), body).await
}

/// Like [`mutate_as`], with a caller-minted bearer token.
pub async fn mutate_with_token(
    router: &Router,
    method: &str,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> TestResponse {
    let (csrf_token, csrf_cookie) = get_csrf_token(router).await;
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header("x-csrf-token", &csrf_token)
        .header("cookie", format!("csrf_token={}", csrf_cookie));

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    send(router, request).await
}

/// Creates a quiz through the API and returns its id.
pub async fn create_quiz(router: &Router, user_id: &str, question: &str, answer: &str) -> String {
    let response = mutate_as(
        router,
        "POST",
        "/api/v1/quizzes",
        user_id,
        Some(serde_json::json!({ "question": question, "answer": answer })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.json);
    response.json["quiz"]["id"].as_str().unwrap().to_string()
}
