//! Location map endpoints.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::error;

use super::session::{authorize, CurrentSession};
use super::{ApiError, AppState};
use crate::models::{Location, Role};
use crate::pipeline::{IngestReport, StoreStatus};

/// Role-projected locations; an empty store triggers a reload first
pub async fn list(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<Location>>, ApiError> {
    authorize(&session, &[Role::Admin, Role::SuperUser, Role::User], "/api/ubicaciones")?;
    let locations = state.locations.locations_for(&session.role).await?;
    Ok(Json(locations))
}

#[derive(Serialize)]
pub struct ReloadResponse {
    #[serde(flatten)]
    report: IngestReport,
    status: StoreStatus,
}

/// Force a rebuild from the CSV source (admin only)
pub async fn reload(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<ReloadResponse>, ApiError> {
    authorize(&session, &[Role::Admin], "/api/ubicaciones/reload")?;

    let report = state.locations.rebuild().await.map_err(|e| {
        error!("Location reload failed: {}", e);
        ApiError::Internal(e.to_string())
    })?;

    Ok(Json(ReloadResponse {
        report,
        status: state.locations.status(),
    }))
}
