//! Protocol event dispatch.
//!
//! Consumes decoded inbound events plus the implicit session-end, mutates
//! the presence store, and triggers the matching broadcasts and alerts.
//! The dispatcher itself is stateless; per-connection state is implicit in
//! the presence store.

use crate::alerts::Alert;
use crate::presence::{CameraView, FieldUnitPresence};
use crate::state::AppState;
use crate::status;
use crate::ws::broadcast;
use crate::ws::protocol::{CameraReport, Inbound, Outbound, UnitReport};

pub async fn dispatch(state: &AppState, connection_id: &str, event: Inbound) {
    match event {
        Inbound::UnitOnline(report) => unit_online(state, connection_id, report).await,
        Inbound::JoinPoleTopic { pole_code } => {
            state.topics.join(connection_id, &pole_code);
            tracing::info!(
                connection_id = %connection_id,
                pole_code = %pole_code,
                "observer joined pole topic"
            );
        }
        Inbound::CameraOnline(report) => camera_online(state, connection_id, report),
        Inbound::CameraOffline(report) => camera_offline(state, connection_id, report),
        Inbound::ResourceRequest {
            pole_code,
            requester_connection_id,
        } => {
            broadcast::to_topic(
                &state.connections,
                &state.topics,
                &pole_code,
                &Outbound::ResourceRequest {
                    pole_code: pole_code.clone(),
                    requester_connection_id,
                },
            );
        }
        Inbound::ResourceReply(reply) => {
            let requester = reply.requester_connection_id.clone();
            broadcast::to_connection(&state.connections, &requester, &Outbound::ResourceReply(reply));
        }
        Inbound::GenericAlert(alert) => {
            let _task = state.alerts.raise(Alert::operator(alert));
        }
    }
}

/// Implicit event fired by the transport when a connection is lost. Runs to
/// completion even on abnormal drops; registry and topic cleanup happen in
/// the actor regardless of what this resolves.
pub async fn handle_session_end(state: &AppState, connection_id: &str) {
    // Recover the claimed identity before anything is purged.
    let Some(unit) = state.presence.remove_unit(connection_id) else {
        // Pure observer connection: nothing to purge, nothing to alert.
        return;
    };

    let purged = state.presence.purge_by_pole(&unit.pole_code);
    tracing::info!(
        connection_id = %connection_id,
        pole_code = %unit.pole_code,
        purged_cameras = purged,
        "field unit disconnected"
    );

    broadcast_unit_list(state).await;

    // The alert owns the pole code recovered above, so it survives the purge
    // racing any in-flight work for the same pole.
    let _task = state.alerts.raise(Alert::unit_disconnected(&unit));
}

async fn unit_online(state: &AppState, connection_id: &str, report: UnitReport) {
    let pole_code = report.pole_code.clone();
    state.presence.report_unit_online(FieldUnitPresence {
        connection_id: connection_id.to_string(),
        pole_code: report.pole_code,
        router_ip: report.router_ip,
        file_server_id: report.file_server_id,
        metadata: report.metadata,
    });
    state.topics.join(connection_id, &pole_code);
    tracing::info!(
        connection_id = %connection_id,
        pole_code = %pole_code,
        "field unit online"
    );

    broadcast_unit_list(state).await;
}

fn camera_online(state: &AppState, connection_id: &str, report: CameraReport) {
    let transition = state.presence.report_camera_online(
        connection_id,
        &report.camera_ip,
        &report.pole_code,
        report.metadata,
    );
    if transition.recovered {
        // Recovery raises no alert, only the list broadcast below.
        tracing::info!(
            camera_ip = %report.camera_ip,
            pole_code = %report.pole_code,
            "camera recovered"
        );
    }

    state.topics.join(connection_id, &report.pole_code);
    broadcast_pole_cameras(state, &report.pole_code);
}

fn camera_offline(state: &AppState, connection_id: &str, report: CameraReport) {
    let transition = state.presence.report_camera_offline(
        connection_id,
        &report.camera_ip,
        &report.pole_code,
        report.metadata,
    );
    if transition.was_online {
        let _task = state
            .alerts
            .raise(Alert::camera_disconnected(&transition.record));
    }

    state.topics.join(connection_id, &report.pole_code);
    broadcast_pole_cameras(state, &report.pole_code);
}

/// Push the catalog-merged unit list to every connection.
pub(crate) async fn broadcast_unit_list(state: &AppState) {
    match status::poles_with_status(state).await {
        Ok(poles) => broadcast::to_all(&state.connections, &Outbound::UnitListUpdated(poles)),
        Err(e) => {
            tracing::warn!(error = %e, "unit list broadcast skipped, catalog read failed");
        }
    }
}

/// Push the latest camera records for a pole to its topic.
fn broadcast_pole_cameras(state: &AppState, pole_code: &str) {
    let cameras = state.presence.list_by_pole(pole_code, CameraView::All);
    broadcast::to_topic(
        &state.connections,
        &state.topics,
        pole_code,
        &Outbound::PoleCameraListUpdated {
            pole_code: pole_code.to_string(),
            cameras,
        },
    );
}
