//! Presence store properties: last-event-wins per identity, view
//! disjointness, purge scoping, and the offline-transition flag that gates
//! alerting.

use polewatch_server::presence::{
    CameraState, CameraView, FieldUnitPresence, Metadata, PresenceStore,
};

fn meta(pairs: &[(&str, &str)]) -> Metadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
        .collect()
}

fn unit(connection_id: &str, pole_code: &str) -> FieldUnitPresence {
    FieldUnitPresence {
        connection_id: connection_id.to_string(),
        pole_code: pole_code.to_string(),
        router_ip: "10.0.7.1".to_string(),
        file_server_id: "fs-7".to_string(),
        metadata: Metadata::new(),
    }
}

#[test]
fn last_event_wins_per_identity() {
    let store = PresenceStore::new();

    store.report_camera_online("c1", "10.11.5.144", "P2", Metadata::new());
    store.report_camera_offline("c1", "10.11.5.144", "P2", Metadata::new());
    store.report_camera_online("c1", "10.11.5.144", "P2", Metadata::new());

    let all = store.list_by_pole("P2", CameraView::All);
    assert_eq!(all.len(), 1, "exactly one record per identity");
    assert_eq!(all[0].state, CameraState::Online);

    assert_eq!(store.list_by_pole("P2", CameraView::Online).len(), 1);
    assert!(store.list_by_pole("P2", CameraView::Offline).is_empty());
}

#[test]
fn repeated_online_reports_do_not_duplicate() {
    let store = PresenceStore::new();

    store.report_camera_online("c1", "10.11.5.144", "P2", meta(&[("model", "ax-200")]));
    store.report_camera_online("c1", "10.11.5.144", "P2", meta(&[("model", "ax-201")]));

    let online = store.list_by_pole("P2", CameraView::Online);
    assert_eq!(online.len(), 1);
    assert_eq!(store.list_by_pole("P2", CameraView::All).len(), 1);

    // Upsert semantics: the latest report's metadata replaces the prior one.
    assert_eq!(
        online[0].metadata.get("model").and_then(|v| v.as_str()),
        Some("ax-201")
    );
}

#[test]
fn offline_transition_reports_prior_online_state() {
    let store = PresenceStore::new();

    // First sighting as offline: ordinary upsert, no alert trigger.
    let first = store.report_camera_offline("c1", "10.11.5.144", "P2", Metadata::new());
    assert!(!first.was_online);
    assert_eq!(first.record.state, CameraState::Offline);

    // Online then offline: the transition that triggers alerting.
    store.report_camera_online("c1", "10.11.5.144", "P2", Metadata::new());
    let dropped = store.report_camera_offline("c1", "10.11.5.144", "P2", Metadata::new());
    assert!(dropped.was_online);

    // Repeating the offline report: already offline, no trigger.
    let repeated = store.report_camera_offline("c1", "10.11.5.144", "P2", Metadata::new());
    assert!(!repeated.was_online);
}

#[test]
fn recovery_is_reported_but_distinct_from_first_sighting() {
    let store = PresenceStore::new();

    let first = store.report_camera_online("c1", "10.11.5.144", "P2", Metadata::new());
    assert!(!first.recovered);

    store.report_camera_offline("c1", "10.11.5.144", "P2", Metadata::new());
    let back = store.report_camera_online("c1", "10.11.5.144", "P2", Metadata::new());
    assert!(back.recovered);
    assert!(store.list_by_pole("P2", CameraView::Offline).is_empty());
}

#[test]
fn identity_is_the_reporting_connection_too() {
    let store = PresenceStore::new();

    // The same physical camera reported over two connections is two records.
    store.report_camera_online("c1", "10.11.5.144", "P2", Metadata::new());
    store.report_camera_online("c2", "10.11.5.144", "P2", Metadata::new());

    assert_eq!(store.list_by_pole("P2", CameraView::All).len(), 2);

    // One going offline does not affect the other.
    let t = store.report_camera_offline("c1", "10.11.5.144", "P2", Metadata::new());
    assert!(t.was_online);
    assert_eq!(store.list_by_pole("P2", CameraView::Online).len(), 1);
    assert_eq!(store.list_by_pole("P2", CameraView::Offline).len(), 1);
}

#[test]
fn purge_by_pole_is_scoped() {
    let store = PresenceStore::new();

    store.report_camera_online("c1", "10.11.5.144", "P2", Metadata::new());
    store.report_camera_offline("c1", "10.11.5.145", "P2", Metadata::new());
    store.report_camera_online("c2", "10.11.9.17", "P9", Metadata::new());

    let purged = store.purge_by_pole("P2");
    assert_eq!(purged, 2);

    for view in [CameraView::All, CameraView::Online, CameraView::Offline] {
        assert!(store.list_by_pole("P2", view).is_empty());
    }

    // Other poles untouched; purging an unknown pole is a no-op.
    assert_eq!(store.list_by_pole("P9", CameraView::Online).len(), 1);
    assert_eq!(store.purge_by_pole("P404"), 0);
}

#[test]
fn unit_upsert_and_removal() {
    let store = PresenceStore::new();

    store.report_unit_online(unit("c1", "P2"));
    // Re-registration under the same connection replaces, never appends.
    store.report_unit_online(unit("c1", "P3"));

    assert_eq!(store.online_units().len(), 1);
    let codes = store.online_pole_codes();
    assert!(codes.contains("P3"));
    assert!(!codes.contains("P2"), "stale pole claim must be dropped");

    let removed = store.remove_unit("c1").expect("unit was online");
    assert_eq!(removed.pole_code, "P3");
    assert!(store.remove_unit("c1").is_none(), "second removal is a miss");
    assert!(store.online_pole_codes().is_empty());
    assert!(store.unit_by_connection("c1").is_none());
}

#[test]
fn pole_scenario_end_to_end() {
    let store = PresenceStore::new();

    store.report_unit_online(unit("u1", "P2"));
    store.report_camera_online("u1", "10.11.5.144", "P2", meta(&[("router_ip", "10.0.7.1")]));
    assert_eq!(store.list_by_pole("P2", CameraView::Online).len(), 1);

    let t = store.report_camera_offline("u1", "10.11.5.144", "P2", Metadata::new());
    assert!(t.was_online, "online→offline must report the transition");
    assert_eq!(t.record.pole_code, "P2");
    assert!(store.list_by_pole("P2", CameraView::Online).is_empty());
    assert_eq!(store.list_by_pole("P2", CameraView::Offline).len(), 1);

    // Disconnect handling: recover the pole code, then purge.
    let gone = store.remove_unit("u1").expect("unit present");
    assert_eq!(gone.pole_code, "P2");
    store.purge_by_pole(&gone.pole_code);
    assert!(store.list_by_pole("P2", CameraView::All).is_empty());
}
