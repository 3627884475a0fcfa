/// Database row types for the catalog and notification tables.
/// These correspond to the SQLite schema defined in migrations.rs.
use serde::Serialize;

/// Pole row as returned by the catalog join (zone name and camera count
/// included, soft-deleted rows excluded).
#[derive(Debug, Clone, Serialize)]
pub struct PoleRow {
    pub id: i64,
    pub zone_id: i64,
    pub zone_name: String,
    pub code: String,
    pub router_ip: String,
    pub router_vpn_ip: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub camera_count: i64,
}

/// Camera row as returned by the per-pole catalog query.
#[derive(Debug, Clone, Serialize)]
pub struct CameraRow {
    pub id: i64,
    pub pole_id: i64,
    pub pole_code: String,
    pub camera_ip: String,
    pub number_of_parking: i64,
}

/// Persisted notification record.
#[derive(Debug, Clone)]
pub struct NotificationRow {
    pub id: i64,
    pub user_id: i64,
    pub pole_router_ip: String,
    pub pole_code: String,
    pub description: String,
    pub note: String,
    pub is_read: bool,
    pub created_at: String,
}
