//! Login, logout, session extraction and role gates.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, State},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{ApiError, AppState};
use crate::auth::{clear_session_cookie, session_cookie, session_id_from_cookie_header, Session};
use crate::models::Role;

const HOME_URL: &str = "/preguntas";

/// The caller's live session, or a 401 rejection
pub struct CurrentSession(pub Session);

/// The caller's live session if there is one
pub struct MaybeSession(pub Option<Session>);

fn session_from_parts(parts: &Parts, state: &AppState) -> Option<Session> {
    let id = parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(session_id_from_cookie_header)?;
    state.sessions.get(&id)
}

impl FromRequestParts<Arc<AppState>> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        session_from_parts(parts, state)
            .map(CurrentSession)
            .ok_or(ApiError::Unauthenticated)
    }
}

impl FromRequestParts<Arc<AppState>> for MaybeSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeSession(session_from_parts(parts, state)))
    }
}

/// Check the session's role against the roles a route admits.
pub fn authorize(session: &Session, allowed: &[Role], route: &str) -> Result<Role, ApiError> {
    match session.role.parse::<Role>() {
        Ok(role) if allowed.contains(&role) => Ok(role),
        _ => {
            let allowed: Vec<&str> = allowed.iter().map(Role::as_str).collect();
            warn!(
                "Access denied for role '{}' to {}. Allowed roles: {}",
                session.role,
                route,
                allowed.join(", ")
            );
            Err(ApiError::Forbidden("Acceso denegado".to_string()))
        }
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    success: bool,
    message: String,
    #[serde(rename = "redirectURL", skip_serializing_if = "Option::is_none")]
    redirect_url: Option<&'static str>,
}

/// Start a session for valid credentials
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Response {
    match state.users.authenticate(&request.username, &request.password) {
        Ok(identity) => {
            let session = state.sessions.create(identity);
            info!("User '{}' logged in as {}", session.user_id, session.role);
            let cookie = session_cookie(&session, state.sessions.ttl(), state.secure_cookies);
            (
                [(header::SET_COOKIE, cookie)],
                Json(LoginResponse {
                    success: true,
                    message: "Login exitoso".to_string(),
                    redirect_url: Some(HOME_URL),
                }),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::UNAUTHORIZED,
            Json(LoginResponse {
                success: false,
                message: e.to_string(),
                redirect_url: None,
            }),
        )
            .into_response(),
    }
}

#[derive(Serialize)]
struct LogoutResponse {
    message: &'static str,
    #[serde(rename = "redirectURL")]
    redirect_url: &'static str,
}

/// End the current session, if any
pub async fn logout(State(state): State<Arc<AppState>>, MaybeSession(session): MaybeSession) -> Response {
    if let Some(session) = session {
        state.sessions.remove(&session.id);
        info!("User '{}' logged out", session.user_id);
    }

    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(LogoutResponse {
            message: "Sesión cerrada",
            redirect_url: "/",
        }),
    )
        .into_response()
}

#[derive(Serialize)]
pub struct UserRoleResponse {
    #[serde(rename = "userRole")]
    user_role: String,
}

/// Role of the logged-in user, for client-side navigation
pub async fn user_role(CurrentSession(session): CurrentSession) -> Json<UserRoleResponse> {
    Json(UserRoleResponse {
        user_role: session.role,
    })
}

#[derive(Serialize)]
pub struct UserInfoResponse {
    id: String,
    nombre: Option<String>,
    role: String,
}

pub async fn user_info(CurrentSession(session): CurrentSession) -> Json<UserInfoResponse> {
    Json(UserInfoResponse {
        id: session.user_id,
        nombre: session.nombre,
        role: session.role,
    })
}
