use axum::{extract::State, response::IntoResponse, Json};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::middlewares::csrf::{csrf_cookie, generate_csrf_token};
use crate::services::AppState;

/// GET /api/v1/auth/csrf-token - CSRF token in the body and as a cookie
pub async fn get_csrf_token(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> impl IntoResponse {
    tracing::debug!("Generating CSRF token");

    let token = generate_csrf_token();
    let jar = jar.add(csrf_cookie(&token, state.config.cookie_secure));

    (jar, Json(serde_json::json!({ "csrf_token": token })))
}
