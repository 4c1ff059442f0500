//! Question CRUD endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use super::session::{authorize, CurrentSession};
use super::{ApiError, AppState};
use crate::models::{Question, QuestionDraft, Role};

const READERS: &[Role] = &[Role::Admin, Role::SuperUser, Role::User];

pub async fn list(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<Question>>, ApiError> {
    authorize(&session, READERS, "/api/preguntas")?;
    Ok(Json(state.questions.list().await))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Json(draft): Json<QuestionDraft>,
) -> Result<(StatusCode, Json<Question>), ApiError> {
    authorize(&session, READERS, "/api/preguntas")?;
    let question = state.questions.create(draft).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> Result<Json<Question>, ApiError> {
    authorize(&session, READERS, "/api/preguntas/{id}")?;
    state
        .questions
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Pregunta no encontrada.".to_string()))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
    Json(draft): Json<QuestionDraft>,
) -> Result<Json<Question>, ApiError> {
    authorize(&session, READERS, "/api/preguntas/{id}")?;
    Ok(Json(state.questions.update(&id, draft).await?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    authorize(&session, READERS, "/api/preguntas/{id}")?;
    state.questions.delete(&id).await?;
    Ok(Json(json!({ "message": "Pregunta eliminada correctamente." })))
}
