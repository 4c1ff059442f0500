//! Admin chat endpoint forwarding prompts to the text-generation service.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::session::{authorize, CurrentSession};
use super::{ApiError, AppState};
use crate::models::Role;

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    message: String,
}

/// Replies and chat failures share this shape so the page can show either
#[derive(Serialize)]
pub struct ChatResponse {
    response: String,
}

fn reply(status: StatusCode, response: String) -> Response {
    (status, Json(ChatResponse { response })).into_response()
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    authorize(&session, &[Role::Admin], "/api/chat")?;

    if request.message.trim().is_empty() {
        return Ok(reply(
            StatusCode::BAD_REQUEST,
            "El mensaje no puede estar vacío.".to_string(),
        ));
    }

    let Some(client) = &state.chat else {
        error!("Chat requested but GEMINI_API_KEY is not configured");
        return Ok(reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            "El servicio de IA no está configurado.".to_string(),
        ));
    };

    info!("Chat message from '{}' ({} chars)", session.user_id, request.message.len());
    match client.send(&request.message).await {
        Ok(text) => Ok(reply(StatusCode::OK, text)),
        Err(e) => {
            error!("Chat request failed: {}", e);
            Ok(reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!(
                    "Error al procesar la solicitud con Gemini: {}. Por favor, intenta de nuevo.",
                    e
                ),
            ))
        }
    }
}
