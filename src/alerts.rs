//! Disconnect alerting: recipient resolution, notification persistence, and
//! the live broadcast that keeps connected dashboards current.
//!
//! The pipeline is fire-and-forget from the dispatcher's point of view. A
//! failing collaborator is logged at this boundary and never rolls back the
//! presence mutation that triggered the alert.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::db::{notify, BoxError, DbPool};
use crate::presence::{CameraPresence, FieldUnitPresence, Metadata};
use crate::ws::broadcast;
use crate::ws::protocol::{OperatorAlert, Outbound};
use crate::ws::ConnectionRegistry;

/// Upper bound on any single collaborator call so a slow permission or
/// notification backend cannot stall alerting indefinitely.
const COLLABORATOR_TIMEOUT: Duration = Duration::from_secs(5);

/// Capability gating notification fan-out.
const VIEW_NOTIFICATION: &str = "view_notification";

/// A detected adverse transition, carrying everything needed to notify.
/// Fields are captured at invocation time; nothing is re-resolved later, so
/// an alert survives a disconnect purge racing it.
#[derive(Debug, Clone)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub pole_code: String,
    pub pole_router_ip: String,
    pub note: String,
}

impl Alert {
    pub fn camera_disconnected(record: &CameraPresence) -> Self {
        let file_server_id = meta_str(&record.metadata, "file_server_id");
        Self {
            title: "camera disconnected".to_string(),
            message: format!("file_server_id: {file_server_id}"),
            pole_code: record.pole_code.clone(),
            pole_router_ip: meta_str(&record.metadata, "router_ip"),
            note: format!(
                "file_server_id: {file_server_id} camera ip: {}",
                record.camera_ip
            ),
        }
    }

    pub fn unit_disconnected(unit: &FieldUnitPresence) -> Self {
        Self {
            title: "device disconnected".to_string(),
            message: format!("file_server_id: {}", unit.file_server_id),
            pole_code: unit.pole_code.clone(),
            pole_router_ip: unit.router_ip.clone(),
            note: format!("file_server_id: {}", unit.file_server_id),
        }
    }

    /// Operator-raised alert passed through verbatim.
    pub fn operator(alert: OperatorAlert) -> Self {
        Self {
            note: format!("{} >> {}", alert.file_server_id, alert.message),
            title: alert.title,
            message: alert.message,
            pole_code: alert.pole_code,
            pole_router_ip: alert.router_ip,
        }
    }
}

#[derive(Clone)]
pub struct AlertPipeline {
    db: DbPool,
    connections: ConnectionRegistry,
}

impl AlertPipeline {
    pub fn new(db: DbPool, connections: ConnectionRegistry) -> Self {
        Self { db, connections }
    }

    /// Raise an alert as a background task. The returned handle is for
    /// callers that need to cancel or await the delivery; dropping it
    /// detaches the task.
    pub fn raise(&self, alert: Alert) -> JoinHandle<()> {
        let pipeline = self.clone();
        tokio::spawn(async move {
            pipeline.deliver(alert).await;
        })
    }

    async fn deliver(&self, alert: Alert) {
        if let Err(e) = self.persist(&alert).await {
            tracing::warn!(
                pole_code = %alert.pole_code,
                title = %alert.title,
                error = %e,
                "notification persistence failed"
            );
        }

        // Presence truth is already committed; dashboards hear about the
        // transition even when persistence is down.
        broadcast::to_all(
            &self.connections,
            &Outbound::LiveNotification {
                title: alert.title.clone(),
                message: alert.message.clone(),
            },
        );
    }

    /// Resolve the recipient set and fan the notification out to it. An
    /// empty recipient set is a no-op, not an error.
    async fn persist(&self, alert: &Alert) -> Result<(), BoxError> {
        let db = self.db.clone();
        let recipients = timeout(
            COLLABORATOR_TIMEOUT,
            tokio::task::spawn_blocking(move || {
                let conn = db.lock().unwrap_or_else(|e| e.into_inner());
                notify::active_user_ids_with_permission(&conn, VIEW_NOTIFICATION)
            }),
        )
        .await???;

        if recipients.is_empty() {
            tracing::debug!(title = %alert.title, "no eligible notification recipients");
            return Ok(());
        }

        let db = self.db.clone();
        let alert_owned = alert.clone();
        let written = timeout(
            COLLABORATOR_TIMEOUT,
            tokio::task::spawn_blocking(move || {
                let conn = db.lock().unwrap_or_else(|e| e.into_inner());
                notify::write_notifications(&conn, &recipients, &alert_owned)
            }),
        )
        .await???;

        tracing::debug!(
            title = %alert.title,
            pole_code = %alert.pole_code,
            recipients = written,
            "notifications persisted"
        );
        Ok(())
    }
}

fn meta_str(metadata: &Metadata, key: &str) -> String {
    metadata
        .get(key)
        .and_then(|value| value.as_str())
        .unwrap_or_default()
        .to_string()
}
