//! Named-event envelopes for the duplex protocol.
//!
//! Every frame is JSON text of the shape
//! `{ "event": "<kebab-case-name>", "data": { ... } }`. Unknown or
//! malformed inbound frames are logged and ignored; the connection stays
//! open and no state is mutated.

use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::presence::{CameraPresence, Metadata};
use crate::state::AppState;
use crate::status::PoleStatus;
use crate::ws::events;

/// Events peers send to the server.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum Inbound {
    /// A field unit announcing itself for a pole.
    UnitOnline(UnitReport),
    /// Observer-only topic subscription; no presence effect.
    JoinPoleTopic { pole_code: String },
    CameraOnline(CameraReport),
    CameraOffline(CameraReport),
    /// Dashboard asking a pole's field unit for its resource stats.
    ResourceRequest {
        pole_code: String,
        requester_connection_id: String,
    },
    /// Field unit answering a resource request.
    ResourceReply(ResourceReply),
    /// Operator-raised alert, passed through to the alerting pipeline.
    GenericAlert(OperatorAlert),
}

/// Events the server sends to peers.
#[derive(Debug, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum Outbound {
    /// First frame of every session.
    AssignedConnectionId { connection_id: String },
    /// Full catalog pole list merged with live status, global scope.
    UnitListUpdated(Vec<PoleStatus>),
    /// Latest camera records for one pole, pole-topic scope.
    PoleCameraListUpdated {
        pole_code: String,
        cameras: Vec<CameraPresence>,
    },
    /// Resource request relayed to the pole topic.
    ResourceRequest {
        pole_code: String,
        requester_connection_id: String,
    },
    /// Resource reply unicast back to the requester.
    ResourceReply(ResourceReply),
    /// Lightweight live alert, global scope.
    LiveNotification { title: String, message: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitReport {
    pub pole_code: String,
    #[serde(default)]
    pub router_ip: String,
    #[serde(default)]
    pub file_server_id: String,
    #[serde(flatten)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraReport {
    pub camera_ip: String,
    pub pole_code: String,
    #[serde(flatten)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceReply {
    pub requester_connection_id: String,
    pub pole_code: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperatorAlert {
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub pole_code: String,
    #[serde(default)]
    pub router_ip: String,
    #[serde(default)]
    pub file_server_id: String,
}

/// Handle one inbound text frame: decode and dispatch.
pub async fn handle_text_frame(state: &AppState, connection_id: &str, text: &str) {
    match serde_json::from_str::<Inbound>(text) {
        Ok(event) => events::dispatch(state, connection_id, event).await,
        Err(e) => {
            tracing::warn!(
                connection_id = %connection_id,
                error = %e,
                "ignoring malformed event frame"
            );
        }
    }
}

/// Encode an outbound event as a text WebSocket message.
pub fn encode(event: &Outbound) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(text) => Some(Message::Text(text.into())),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode outbound event");
            None
        }
    }
}
