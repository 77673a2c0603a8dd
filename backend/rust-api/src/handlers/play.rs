use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use uuid::Uuid;

use super::ApiError;
use crate::{
    models::quiz::AnswerQuery,
    services::{random_play_service::RandomPlayService, AppState},
};

pub const PLAY_SESSION_COOKIE: &str = "play_session";

/// Returns the browser's play session key, issuing a cookie on first use.
fn session_key(state: &AppState, jar: CookieJar) -> (String, CookieJar) {
    if let Some(existing) = jar.get(PLAY_SESSION_COOKIE) {
        let value = existing.value().to_string();
        if !value.is_empty() {
            return (value, jar);
        }
    }

    // Missing or empty cookie: start a new session
    let key = Uuid::new_v4().to_string();
    let cookie = Cookie::build((PLAY_SESSION_COOKIE, key.clone()))
        .path("/")
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(
            i64::try_from(state.config.play_session_ttl_seconds).unwrap_or(i64::MAX),
        ))
        .build();
    tracing::debug!("Issued new play session");
    (key, jar.add(cookie))
}

/// GET /api/v1/quizzes/randomplay
pub async fn random_play(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let (key, jar) = session_key(&state, jar);
    let view = RandomPlayService::new(&state).play(&key).await?;
    Ok((jar, Json(view)))
}

/// GET /api/v1/quizzes/randomcheck/{quiz_id}
pub async fn random_check(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(quiz_id): Path<String>,
    Query(query): Query<AnswerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (key, jar) = session_key(&state, jar);
    // No answer parameter counts as an empty, wrong answer
    let answer = query.answer.unwrap_or_default();
    let view = RandomPlayService::new(&state)
        .check(&key, &quiz_id, &answer)
        .await?;
    Ok((jar, Json(view)))
}
