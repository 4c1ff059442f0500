//! HTTP API: shared state, router and handlers.

mod chat;
mod error;
mod locations;
mod questions;
mod session;
mod survey;
mod views;

pub use error::ApiError;
pub use session::{authorize, CurrentSession, MaybeSession};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::auth::{EnvCredential, SessionStore, UserDirectory};
use crate::chat::ChatClient;
use crate::config::Config;
use crate::pipeline::{LocationService, StoreStatus};
use crate::questions::QuestionStore;
use crate::survey::SurveySink;

/// Application state shared across handlers
pub struct AppState {
    pub locations: Arc<LocationService>,
    pub users: UserDirectory,
    pub sessions: SessionStore,
    pub questions: QuestionStore,
    pub survey: SurveySink,
    /// `None` when no API key was provided
    pub chat: Option<ChatClient>,
    pub public_dir: PathBuf,
    pub secure_cookies: bool,
}

impl AppState {
    /// Build state from config. Location ingestion is not started here.
    pub async fn new(
        config: &Config,
        env_admin: Option<EnvCredential>,
        env_super_user: Option<EnvCredential>,
    ) -> Self {
        let users = UserDirectory::load(&config.data.users)
            .await
            .with_env_credentials(env_admin, env_super_user);

        Self {
            locations: Arc::new(LocationService::new(
                &config.data.boundary,
                &config.data.locations,
            )),
            users,
            sessions: SessionStore::new(chrono::Duration::minutes(
                config.server.session_ttl_minutes,
            )),
            questions: QuestionStore::load(&config.data.questions).await,
            survey: SurveySink::new(&config.data.survey_log),
            chat: None,
            public_dir: config.server.public_dir.clone(),
            secure_cookies: config.server.secure_cookies,
        }
    }

    pub fn with_chat(mut self, chat: ChatClient) -> Self {
        self.chat = Some(chat);
        self
    }
}

/// Sweep expired sessions on a fixed period.
///
/// Lookups only evict the session they hit, so sessions whose cookie never
/// comes back are removed here.
pub fn spawn_session_purge(state: Arc<AppState>, period: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let purged = state.sessions.purge_expired();
            if purged > 0 {
                debug!("Purged {} expired sessions", purged);
            }
        }
    })
}

pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.public_dir)
        .not_found_service(ServeFile::new(state.public_dir.join("404.html")));

    Router::new()
        .route("/", get(views::login_page))
        .route("/login", post(session::login))
        .route("/logout", post(session::logout))
        .route("/health", get(health_handler))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .route("/preguntas", get(views::preguntas))
        .route("/nuevaPregunta", get(views::nueva_pregunta))
        .route("/charts", get(views::charts))
        .route("/mapa", get(views::mapa))
        .route("/api/user-role", get(session::user_role))
        .route("/api/userinfo", get(session::user_info))
        .route("/api/ubicaciones", get(locations::list))
        .route("/api/ubicaciones/reload", post(locations::reload))
        .route(
            "/api/preguntas",
            get(questions::list).post(questions::create),
        )
        .route(
            "/api/preguntas/{id}",
            get(questions::get)
                .put(questions::update)
                .delete(questions::delete),
        )
        .route("/api/encuesta", post(survey::submit))
        .route("/api/chat", post(chat::chat))
        .fallback_service(static_files)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    store: StoreStatus,
    locations: usize,
    boundary_loaded: bool,
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store = state.locations.status();
    let boundary_loaded = state.locations.boundary().is_some();

    Json(HealthResponse {
        status: if store == StoreStatus::Ready && boundary_loaded {
            "ok"
        } else {
            "degraded"
        },
        store,
        locations: state.locations.store().len(),
        boundary_loaded,
    })
}
