use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::metrics;
use crate::models::FieldErrors;
use crate::services::{AppState, ServiceError};
use crate::storage::StoreResult;

pub mod auth;
pub mod play;
pub mod quizzes;
pub mod tips;

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut dependencies = serde_json::Map::new();

    let quiz_store = check_dependency("Quiz store", state.quizzes.ping()).await;
    let session_store = check_dependency("Session store", state.play_sessions.ping()).await;
    let all_healthy = is_healthy(&quiz_store) && is_healthy(&session_store);
    dependencies.insert("quiz_store".to_string(), json!(quiz_store));
    dependencies.insert("session_store".to_string(), json!(session_store));

    let (status_code, status) = if all_healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status_code,
        Json(json!({
            "status": status,
            "service": "quizplay-api",
            "version": env!("CARGO_PKG_VERSION"),
            "dependencies": dependencies
        })),
    )
}

async fn check_dependency(
    name: &str,
    ping: impl Future<Output = StoreResult<()>>,
) -> serde_json::Map<String, serde_json::Value> {
    let mut result = serde_json::Map::new();

    // A hung backend must not hang the health check
    match tokio::time::timeout(Duration::from_secs(1), ping).await {
        Ok(Ok(())) => {
            result.insert("status".to_string(), json!("healthy"));
            result.insert("message".to_string(), json!(format!("{} reachable", name)));
        }
        Ok(Err(e)) => {
            result.insert("status".to_string(), json!("unhealthy"));
            result.insert("error".to_string(), json!(e.to_string()));
        }
        Err(_) => {
            result.insert("status".to_string(), json!("unhealthy"));
            result.insert("error".to_string(), json!(format!("{} timeout after 1s", name)));
        }
    }

    result
}

fn is_healthy(result: &serde_json::Map<String, serde_json::Value>) -> bool {
    result.get("status").and_then(|v| v.as_str()) == Some("healthy")
}

pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::render_metrics() {
        Ok(metrics_text) => (StatusCode::OK, metrics_text),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render metrics: {}", e),
        ),
    }
}

/// Protects `/metrics` with HTTP Basic auth (`metrics.auth` as `user:password`).
pub async fn metrics_auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let encoded = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let decoded = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    let credentials = String::from_utf8(decoded).map_err(|_| StatusCode::UNAUTHORIZED)?;

    if credentials != state.config.metrics_auth {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(request).await)
}

/// Confirmation body for successful mutations.
#[derive(Debug, Serialize)]
pub struct MessageResponse<T: Serialize> {
    pub message: &'static str,
    #[serde(flatten)]
    pub data: T,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Forbidden(String),
    NotFound(String),
    /// Rejected form, echoed back under `form_key` with per-field messages.
    Validation {
        errors: FieldErrors,
        form_key: &'static str,
        form: serde_json::Value,
    },
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    /// Maps a service failure, attaching the submitted form to validation
    /// errors.
    pub fn from_service<F: Serialize>(err: ServiceError, form_key: &'static str, form: &F) -> Self {
        match err {
            ServiceError::Validation(errors) => ApiError::Validation {
                errors,
                form_key,
                form: serde_json::to_value(form).unwrap_or(serde_json::Value::Null),
            },
            other => other.into(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(message) => ApiError::NotFound(message),
            ServiceError::Forbidden(message) => ApiError::Forbidden(message),
            ServiceError::Validation(errors) => ApiError::Validation {
                errors,
                form_key: "form",
                form: serde_json::Value::Null,
            },
            ServiceError::Store(e) => {
                tracing::error!("Storage failure: {}", e);
                ApiError::internal("Internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
            ApiError::Validation {
                errors,
                form_key,
                form,
            } => {
                let status = StatusCode::UNPROCESSABLE_ENTITY;
                let mut body = serde_json::Map::new();
                body.insert("message".to_string(), json!("There are errors in the form:"));
                body.insert("status".to_string(), json!(status.as_u16()));
                body.insert("errors".to_string(), json!(errors));
                body.insert(form_key.to_string(), form);
                return (status, Json(serde_json::Value::Object(body))).into_response();
            }
        };

        (
            status,
            Json(json!({ "message": message, "status": status.as_u16() })),
        )
            .into_response()
    }
}
