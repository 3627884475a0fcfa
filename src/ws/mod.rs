pub mod actor;
pub mod broadcast;
pub mod events;
pub mod handler;
pub mod protocol;
pub mod topics;

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::presence::ConnectionId;

/// Type alias for the sender half of a WebSocket connection's channel.
/// Other parts of the system clone this to push messages to a specific peer.
pub type ConnectionSender = mpsc::UnboundedSender<axum::extract::ws::Message>;

/// Live connection registry: connection id → outbound sender.
///
/// The id is issued here on registration and handed back to the peer as the
/// first frame of the session; it is the address later events (resource
/// replies, disconnects) resolve against. Unknown ids resolve to none.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<DashMap<ConnectionId, ConnectionSender>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session and issue its connection id.
    pub fn register(&self, tx: ConnectionSender) -> ConnectionId {
        let connection_id = Uuid::new_v4().to_string();
        self.connections.insert(connection_id.clone(), tx);
        tracing::debug!(
            connection_id = %connection_id,
            connections = self.connections.len(),
            "connection registered"
        );
        connection_id
    }

    /// Drop a session on end. Unknown ids are a no-op.
    pub fn forget(&self, connection_id: &str) {
        self.connections.remove(connection_id);
        tracing::debug!(connection_id = %connection_id, "connection forgotten");
    }

    pub fn sender(&self, connection_id: &str) -> Option<ConnectionSender> {
        self.connections
            .get(connection_id)
            .map(|entry| entry.value().clone())
    }

    /// Snapshot of every live sender, for global fan-out.
    pub fn senders(&self) -> Vec<ConnectionSender> {
        self.connections
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}
