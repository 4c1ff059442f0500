//! Survey submission endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::session::{authorize, CurrentSession};
use super::{ApiError, AppState};
use crate::models::Role;
use crate::survey::{classify, Classification, SurveyRecord};

#[derive(Deserialize)]
pub struct SurveySubmission {
    /// Question id → free-text answer
    respuestas: BTreeMap<String, String>,
}

#[derive(Serialize)]
pub struct SurveyResponse {
    message: &'static str,
    /// Only answers with at least one keyword are listed
    keywords: BTreeMap<String, Classification>,
}

/// Classify answers and persist those that matched
pub async fn submit(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Json(submission): Json<SurveySubmission>,
) -> Result<Json<SurveyResponse>, ApiError> {
    authorize(&session, &[Role::Admin, Role::SuperUser, Role::User], "/api/encuesta")?;

    let mut keywords = BTreeMap::new();
    let mut records = Vec::new();

    for (question_id, answer) in &submission.respuestas {
        if answer.trim().is_empty() {
            continue;
        }
        let classification = classify(answer);
        if classification.is_empty() {
            continue;
        }
        records.push(SurveyRecord::new(question_id, answer, &classification));
        keywords.insert(question_id.clone(), classification);
    }

    state.survey.append(&records).await.map_err(|e| {
        error!("Failed to persist survey answers: {}", e);
        ApiError::Internal("Error al guardar las respuestas".to_string())
    })?;

    info!(
        "Survey from '{}': {} answers, {} with keywords",
        session.user_id,
        submission.respuestas.len(),
        records.len()
    );

    Ok(Json(SurveyResponse {
        message: "Respuestas recibidas con éxito!",
        keywords,
    }))
}
