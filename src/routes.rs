use axum::{routing::get, Router};

use crate::state::AppState;
use crate::status;
use crate::ws::handler as ws_handler;

/// Build the axum Router: the duplex endpoint plus the status-merge reads.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler::ws_upgrade))
        .route("/api/status/poles", get(status::get_pole_status))
        .route(
            "/api/status/poles/{pole_code}/cameras",
            get(status::get_pole_camera_status),
        )
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state)
}
