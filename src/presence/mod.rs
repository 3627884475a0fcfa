//! In-memory presence authority for field units and their reported cameras.
//!
//! One store, one writer lock. Camera identity is the triple
//! (reporting connection id, camera ip, pole code): cameras never connect
//! to the server themselves, they are reported on behalf of by a field
//! unit's connection, so the same physical camera reported over two
//! different connections is two independent records.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

/// Opaque transport-level connection id, valid for one duplex session.
pub type ConnectionId = String;

/// Extra key/values a peer reports alongside the known payload fields.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A live field unit, keyed by the connection it reported over.
#[derive(Debug, Clone)]
pub struct FieldUnitPresence {
    pub connection_id: ConnectionId,
    pub pole_code: String,
    pub router_ip: String,
    pub file_server_id: String,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraState {
    Online,
    Offline,
}

/// Composite camera identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CameraKey {
    pub connection_id: ConnectionId,
    pub camera_ip: String,
    pub pole_code: String,
}

/// Latest known record for one camera identity.
#[derive(Debug, Clone, Serialize)]
pub struct CameraPresence {
    pub connection_id: ConnectionId,
    pub camera_ip: String,
    pub pole_code: String,
    pub state: CameraState,
    #[serde(flatten)]
    pub metadata: Metadata,
}

impl CameraPresence {
    fn key(&self) -> CameraKey {
        CameraKey {
            connection_id: self.connection_id.clone(),
            camera_ip: self.camera_ip.clone(),
            pole_code: self.pole_code.clone(),
        }
    }
}

/// Which camera view to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraView {
    All,
    Online,
    Offline,
}

/// Result of an online report. `recovered` is true when the identity moved
/// Offline→Online; no alert is raised on that direction.
#[derive(Debug)]
pub struct OnlineTransition {
    pub record: CameraPresence,
    pub recovered: bool,
}

/// Result of an offline report. `was_online` reports whether the identity
/// was in the online view immediately before this call; it is the sole
/// trigger condition for camera-disconnect alerting.
#[derive(Debug)]
pub struct OfflineTransition {
    pub record: CameraPresence,
    pub was_online: bool,
}

#[derive(Default)]
struct Views {
    /// connection id → live field unit
    units: HashMap<ConnectionId, FieldUnitPresence>,
    /// pole code → connections currently claiming it
    unit_poles: HashMap<String, HashSet<ConnectionId>>,
    /// latest record per camera identity, regardless of state
    cameras: HashMap<CameraKey, CameraPresence>,
    online: HashSet<CameraKey>,
    offline: HashSet<CameraKey>,
    /// pole code → camera identities, so per-pole reads and purges stay O(k)
    pole_cameras: HashMap<String, HashSet<CameraKey>>,
}

/// The presence store. All mutations go through the single writer lock;
/// status-merge reads run concurrently on the read side.
#[derive(Default)]
pub struct PresenceStore {
    views: RwLock<Views>,
}

impl PresenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Every mutation completes before its guard drops, so a poisoned lock
    // still holds a structurally consistent snapshot. Recover instead of
    // dropping every live connection's presence state.
    fn read(&self) -> RwLockReadGuard<'_, Views> {
        self.views.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Views> {
        self.views.write().unwrap_or_else(|e| e.into_inner())
    }

    // --- Field units ---

    /// Upsert the live unit for its connection. Re-registration under the
    /// same connection id replaces the prior entry.
    pub fn report_unit_online(&self, unit: FieldUnitPresence) -> FieldUnitPresence {
        let mut views = self.write();
        if let Some(prev) = views.units.remove(&unit.connection_id) {
            unindex_unit_pole(&mut views, &prev);
        }
        views
            .unit_poles
            .entry(unit.pole_code.clone())
            .or_default()
            .insert(unit.connection_id.clone());
        views.units.insert(unit.connection_id.clone(), unit.clone());
        unit
    }

    /// Remove and return the unit for a connection, if one ever claimed it.
    /// Disconnect handling uses the returned record to recover the pole code
    /// before purging cameras.
    pub fn remove_unit(&self, connection_id: &str) -> Option<FieldUnitPresence> {
        let mut views = self.write();
        let unit = views.units.remove(connection_id)?;
        unindex_unit_pole(&mut views, &unit);
        Some(unit)
    }

    /// The claimed identity on a connection, if any.
    pub fn unit_by_connection(&self, connection_id: &str) -> Option<FieldUnitPresence> {
        self.read().units.get(connection_id).cloned()
    }

    pub fn online_units(&self) -> Vec<FieldUnitPresence> {
        self.read().units.values().cloned().collect()
    }

    /// Pole codes with at least one live unit, for status merge.
    pub fn online_pole_codes(&self) -> HashSet<String> {
        self.read().unit_poles.keys().cloned().collect()
    }

    // --- Cameras ---

    /// Upsert a camera as online. Removes the identity from the offline
    /// view; a first sighting is an ordinary upsert.
    pub fn report_camera_online(
        &self,
        connection_id: &str,
        camera_ip: &str,
        pole_code: &str,
        metadata: Metadata,
    ) -> OnlineTransition {
        let record = CameraPresence {
            connection_id: connection_id.to_string(),
            camera_ip: camera_ip.to_string(),
            pole_code: pole_code.to_string(),
            state: CameraState::Online,
            metadata,
        };
        let key = record.key();

        let mut views = self.write();
        let recovered = views.offline.remove(&key);
        views.online.insert(key.clone());
        views
            .pole_cameras
            .entry(record.pole_code.clone())
            .or_default()
            .insert(key.clone());
        views.cameras.insert(key, record.clone());

        OnlineTransition { record, recovered }
    }

    /// Upsert a camera as offline and report whether it was online
    /// immediately before.
    pub fn report_camera_offline(
        &self,
        connection_id: &str,
        camera_ip: &str,
        pole_code: &str,
        metadata: Metadata,
    ) -> OfflineTransition {
        let record = CameraPresence {
            connection_id: connection_id.to_string(),
            camera_ip: camera_ip.to_string(),
            pole_code: pole_code.to_string(),
            state: CameraState::Offline,
            metadata,
        };
        let key = record.key();

        let mut views = self.write();
        let was_online = views.online.remove(&key);
        views.offline.insert(key.clone());
        views
            .pole_cameras
            .entry(record.pole_code.clone())
            .or_default()
            .insert(key.clone());
        views.cameras.insert(key, record.clone());

        OfflineTransition { record, was_online }
    }

    /// Remove every camera record for a pole from all three views.
    ///
    /// Scoped by pole code, not by reporting connection: if two connections
    /// ever report for the same pole code, one disconnecting erases the
    /// other's live cameras. Documented current behavior of the system this
    /// replaces; see DESIGN.md before changing it.
    pub fn purge_by_pole(&self, pole_code: &str) -> usize {
        let mut views = self.write();
        let Some(keys) = views.pole_cameras.remove(pole_code) else {
            return 0;
        };
        for key in &keys {
            views.cameras.remove(key);
            views.online.remove(key);
            views.offline.remove(key);
        }
        keys.len()
    }

    /// Read-only filter over the requested view. Order is unspecified.
    pub fn list_by_pole(&self, pole_code: &str, view: CameraView) -> Vec<CameraPresence> {
        let views = self.read();
        let Some(keys) = views.pole_cameras.get(pole_code) else {
            return Vec::new();
        };
        keys.iter()
            .filter(|key| match view {
                CameraView::All => true,
                CameraView::Online => views.online.contains(*key),
                CameraView::Offline => views.offline.contains(*key),
            })
            .filter_map(|key| views.cameras.get(key).cloned())
            .collect()
    }
}

fn unindex_unit_pole(views: &mut Views, unit: &FieldUnitPresence) {
    if let Some(connections) = views.unit_poles.get_mut(&unit.pole_code) {
        connections.remove(&unit.connection_id);
        if connections.is_empty() {
            views.unit_poles.remove(&unit.pole_code);
        }
    }
}
