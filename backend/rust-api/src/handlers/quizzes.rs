use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiError, MessageResponse};
use crate::{
    extractors::AppJson,
    middlewares::auth::JwtClaims,
    models::{
        quiz::{AnswerQuery, CheckView, EditableQuiz, PlayView, QuizDetail, QuizIndex, QuizIndexQuery},
        QuizForm,
    },
    services::{quiz_service::QuizService, AppState},
};

#[derive(Debug, Serialize)]
pub struct QuizPayload {
    pub quiz: EditableQuiz,
}

/// GET /api/v1/quizzes
pub async fn list_quizzes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuizIndexQuery>,
) -> Result<Json<QuizIndex>, ApiError> {
    let service = QuizService::new(&state);
    let index = service
        .index(query.search, query.pageno.as_deref())
        .await?;
    Ok(Json(index))
}

/// GET /api/v1/users/{user_id}/quizzes
pub async fn list_user_quizzes(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<QuizIndexQuery>,
) -> Result<Json<QuizIndex>, ApiError> {
    let service = QuizService::new(&state);
    let index = service
        .index_for_user(&user_id, query.search, query.pageno.as_deref())
        .await?;
    Ok(Json(index))
}

/// GET /api/v1/quizzes/new
pub async fn new_quiz(State(state): State<Arc<AppState>>) -> Json<QuizForm> {
    Json(QuizService::new(&state).new_form())
}

/// POST /api/v1/quizzes
pub async fn create_quiz(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    AppJson(form): AppJson<QuizForm>,
) -> Result<impl IntoResponse, ApiError> {
    let service = QuizService::new(&state);
    let quiz = service
        .create(&claims, &form)
        .await
        .map_err(|e| ApiError::from_service(e, "quiz", &form))?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Quiz created successfully.",
            data: QuizPayload {
                quiz: EditableQuiz::from(&quiz),
            },
        }),
    ))
}

/// GET /api/v1/quizzes/{quiz_id}
pub async fn show_quiz(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<String>,
) -> Result<Json<QuizDetail>, ApiError> {
    Ok(Json(QuizService::new(&state).show(&quiz_id).await?))
}

/// GET /api/v1/quizzes/{quiz_id}/edit
pub async fn edit_quiz(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(quiz_id): Path<String>,
) -> Result<Json<QuizPayload>, ApiError> {
    let quiz = QuizService::new(&state).edit(&claims, &quiz_id).await?;
    Ok(Json(QuizPayload { quiz }))
}

/// PUT /api/v1/quizzes/{quiz_id}
pub async fn update_quiz(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(quiz_id): Path<String>,
    AppJson(form): AppJson<QuizForm>,
) -> Result<Json<MessageResponse<QuizPayload>>, ApiError> {
    let quiz = QuizService::new(&state)
        .update(&claims, &quiz_id, &form)
        .await
        .map_err(|e| ApiError::from_service(e, "quiz", &form))?;

    Ok(Json(MessageResponse {
        message: "Quiz edited successfully.",
        data: QuizPayload {
            quiz: EditableQuiz::from(&quiz),
        },
    }))
}

/// DELETE /api/v1/quizzes/{quiz_id}
pub async fn delete_quiz(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    QuizService::new(&state).delete(&claims, &quiz_id).await?;
    Ok(Json(MessageResponse {
        message: "Quiz deleted successfully.",
        data: serde_json::json!({ "id": quiz_id }),
    }))
}

/// GET /api/v1/quizzes/{quiz_id}/play
pub async fn play_quiz(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<String>,
    Query(query): Query<AnswerQuery>,
) -> Result<Json<PlayView>, ApiError> {
    Ok(Json(QuizService::new(&state).play(&quiz_id, query.answer).await?))
}

/// GET /api/v1/quizzes/{quiz_id}/check
pub async fn check_quiz(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<String>,
    Query(query): Query<AnswerQuery>,
) -> Result<Json<CheckView>, ApiError> {
    Ok(Json(QuizService::new(&state).check(&quiz_id, query.answer).await?))
}
