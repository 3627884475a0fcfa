//! Status merge: catalog truth joined with live presence.
//!
//! The catalog answers "what does this fleet have"; the presence store
//! answers "what is reachable right now". These endpoints (and the
//! unit-list broadcast) merge the two into `status = 1|0` per catalog
//! entry.

use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::db::catalog;
use crate::db::models::{CameraRow, PoleRow};
use crate::db::BoxError;
use crate::presence::CameraView;
use crate::state::AppState;

/// A catalog pole annotated with live status: 1 when some field unit
/// currently claims its code, 0 when dark.
#[derive(Debug, Clone, Serialize)]
pub struct PoleStatus {
    #[serde(flatten)]
    pub pole: PoleRow,
    pub status: u8,
}

/// A catalog camera annotated with live status at its pole.
#[derive(Debug, Clone, Serialize)]
pub struct CameraStatus {
    #[serde(flatten)]
    pub camera: CameraRow,
    pub status: u8,
}

pub async fn poles_with_status(state: &AppState) -> Result<Vec<PoleStatus>, BoxError> {
    let db = state.db.clone();
    let poles = tokio::task::spawn_blocking(move || {
        let conn = db.lock().unwrap_or_else(|e| e.into_inner());
        catalog::poles(&conn)
    })
    .await??;

    let online = state.presence.online_pole_codes();
    Ok(poles
        .into_iter()
        .map(|pole| {
            let status = u8::from(online.contains(&pole.code));
            PoleStatus { pole, status }
        })
        .collect())
}

pub async fn cameras_with_status(
    state: &AppState,
    pole_code: &str,
) -> Result<Vec<CameraStatus>, BoxError> {
    let db = state.db.clone();
    let code = pole_code.to_string();
    let cameras = tokio::task::spawn_blocking(move || {
        let conn = db.lock().unwrap_or_else(|e| e.into_inner());
        catalog::cameras_by_pole(&conn, &code)
    })
    .await??;

    let online: HashSet<String> = state
        .presence
        .list_by_pole(pole_code, CameraView::Online)
        .into_iter()
        .map(|record| record.camera_ip)
        .collect();

    Ok(cameras
        .into_iter()
        .map(|camera| {
            let status = u8::from(online.contains(&camera.camera_ip));
            CameraStatus { camera, status }
        })
        .collect())
}

/// GET /api/status/poles — every catalog pole with live status.
pub async fn get_pole_status(
    State(state): State<AppState>,
) -> Result<Json<Vec<PoleStatus>>, StatusCode> {
    poles_with_status(&state).await.map(Json).map_err(|e| {
        tracing::error!(error = %e, "pole status query failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// GET /api/status/poles/{pole_code}/cameras — one pole's catalog cameras
/// with live status. Unknown pole codes return an empty list.
pub async fn get_pole_camera_status(
    State(state): State<AppState>,
    Path(pole_code): Path<String>,
) -> Result<Json<Vec<CameraStatus>>, StatusCode> {
    cameras_with_status(&state, &pole_code)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!(pole_code = %pole_code, error = %e, "camera status query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}
