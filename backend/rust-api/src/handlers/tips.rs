use axum::{
    extract::{Extension, Path, State},
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
        tip::{EditableTip, TipView},
        TipForm,
    },
    services::{tip_service::TipService, AppState},
};

#[derive(Debug, Serialize)]
pub struct TipPayload {
    pub tip: TipView,
}

fn payload(tip: &crate::models::Tip) -> TipPayload {
    TipPayload {
        tip: TipView::from_tip(tip, None),
    }
}

/// POST /api/v1/quizzes/{quiz_id}/tips
pub async fn create_tip(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path(quiz_id): Path<String>,
    AppJson(form): AppJson<TipForm>,
) -> Result<impl IntoResponse, ApiError> {
    let tip = TipService::new(&state)
        .create(&claims, &quiz_id, &form)
        .await
        .map_err(|e| ApiError::from_service(e, "tip", &form))?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Tip created successfully.",
            data: payload(&tip),
        }),
    ))
}

/// GET /api/v1/quizzes/{quiz_id}/tips/{tip_id}/edit
pub async fn edit_tip(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path((quiz_id, tip_id)): Path<(String, String)>,
) -> Result<Json<EditableTip>, ApiError> {
    Ok(Json(
        TipService::new(&state)
            .edit(&claims, &quiz_id, &tip_id)
            .await?,
    ))
}

/// PUT /api/v1/quizzes/{quiz_id}/tips/{tip_id}
pub async fn update_tip(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path((quiz_id, tip_id)): Path<(String, String)>,
    AppJson(form): AppJson<TipForm>,
) -> Result<Json<MessageResponse<TipPayload>>, ApiError> {
    let tip = TipService::new(&state)
        .update(&claims, &quiz_id, &tip_id, &form)
        .await
        .map_err(|e| ApiError::from_service(e, "tip", &form))?;

    Ok(Json(MessageResponse {
        message: "Tip edited successfully.",
        data: payload(&tip),
    }))
}

/// POST /api/v1/quizzes/{quiz_id}/tips/{tip_id}/accept
pub async fn accept_tip(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path((quiz_id, tip_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse<TipPayload>>, ApiError> {
    let tip = TipService::new(&state)
        .accept(&claims, &quiz_id, &tip_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "Tip accepted successfully.",
        data: payload(&tip),
    }))
}

/// DELETE /api/v1/quizzes/{quiz_id}/tips/{tip_id}
pub async fn delete_tip(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Path((quiz_id, tip_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    TipService::new(&state)
        .delete(&claims, &quiz_id, &tip_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "Tip deleted successfully.",
        data: serde_json::json!({ "id": tip_id }),
    }))
}
