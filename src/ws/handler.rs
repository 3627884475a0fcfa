use axum::{
    extract::{ws::WebSocketUpgrade, State},
    response::Response,
};

use crate::state::AppState;
use crate::ws::actor;

/// GET /ws
///
/// Duplex endpoint for field units and dashboard observers alike. The
/// server assigns a connection id on upgrade; identity is whatever the peer
/// subsequently claims through presence events.
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| actor::run_connection(socket, state))
}
