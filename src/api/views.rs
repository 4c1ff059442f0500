//! Role-gated HTML views served from the public directory.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::error;

use super::session::{authorize, MaybeSession};
use super::AppState;
use crate::models::Role;

const ALL_ROLES: &[Role] = &[Role::Admin, Role::SuperUser, Role::User];
const EDITORS: &[Role] = &[Role::Admin, Role::SuperUser];

async fn read_page(public_dir: &Path, page: &str) -> Option<String> {
    match tokio::fs::read_to_string(public_dir.join(page)).await {
        Ok(html) => Some(html),
        Err(e) => {
            error!("Failed to read page {}: {}", page, e);
            None
        }
    }
}

async fn send_page(public_dir: &Path, page: &str, status: StatusCode) -> Response {
    match read_page(public_dir, page).await {
        Some(html) => (status, Html(html)).into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "Página no disponible").into_response(),
    }
}

async fn gated_page(
    state: &AppState,
    session: MaybeSession,
    allowed: &[Role],
    route: &str,
    page: &str,
) -> Response {
    let Some(session) = session.0 else {
        return Redirect::to("/").into_response();
    };

    if authorize(&session, allowed, route).is_err() {
        return match read_page(&state.public_dir, "unauthorized.html").await {
            Some(html) => (StatusCode::FORBIDDEN, Html(html)).into_response(),
            None => (StatusCode::FORBIDDEN, "Acceso denegado").into_response(),
        };
    }

    send_page(&state.public_dir, page, StatusCode::OK).await
}

/// Login page, or straight to the questions view when already logged in
pub async fn login_page(State(state): State<Arc<AppState>>, session: MaybeSession) -> Response {
    if session.0.is_some() {
        return Redirect::to("/preguntas").into_response();
    }
    send_page(&state.public_dir, "login.html", StatusCode::OK).await
}

pub async fn preguntas(State(state): State<Arc<AppState>>, session: MaybeSession) -> Response {
    gated_page(&state, session, ALL_ROLES, "/preguntas", "preguntas.html").await
}

pub async fn nueva_pregunta(State(state): State<Arc<AppState>>, session: MaybeSession) -> Response {
    gated_page(&state, session, EDITORS, "/nuevaPregunta", "nuevaPregunta.html").await
}

pub async fn charts(State(state): State<Arc<AppState>>, session: MaybeSession) -> Response {
    gated_page(&state, session, EDITORS, "/charts", "charts.html").await
}

pub async fn mapa(State(state): State<Arc<AppState>>, session: MaybeSession) -> Response {
    gated_page(&state, session, ALL_ROLES, "/mapa", "mapa.html").await
}
