//! Error responses for the HTTP API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::AccessDenied;
use crate::questions::QuestionError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No autenticado")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<AccessDenied> for ApiError {
    fn from(e: AccessDenied) -> Self {
        ApiError::Forbidden(format!(
            "Acceso denegado: Rol de usuario no reconocido ({})",
            e.role
        ))
    }
}

impl From<QuestionError> for ApiError {
    fn from(e: QuestionError) -> Self {
        match e {
            QuestionError::MissingFields => ApiError::BadRequest(e.to_string()),
            QuestionError::NotFound(_) => ApiError::NotFound(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_message() {
        let err = ApiError::Unauthenticated;
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "No autenticado");

        let err = ApiError::from(AccessDenied {
            role: "guest".to_string(),
        });
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert!(err.to_string().contains("guest"));
    }

    #[test]
    fn test_question_errors_map_to_status() {
        assert_eq!(
            ApiError::from(QuestionError::MissingFields).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(QuestionError::NotFound("q9".to_string())).status(),
            StatusCode::NOT_FOUND
        );
    }
}
