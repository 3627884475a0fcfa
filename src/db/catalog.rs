//! Catalog reads: the persisted pole and camera inventory, independent of
//! liveness. Status merge joins these against the presence store.

use rusqlite::Connection;

use super::models::{CameraRow, PoleRow};

/// Every non-deleted pole with its zone name and camera count.
pub fn poles(conn: &Connection) -> rusqlite::Result<Vec<PoleRow>> {
    let mut stmt = conn.prepare(
        "SELECT
            p.id,
            p.zone_id,
            z.name AS zone_name,
            p.code,
            p.router_ip,
            p.router_vpn_ip,
            p.lat,
            p.lng,
            COUNT(c.id) AS camera_count
        FROM poles p
        JOIN zones z ON z.id = p.zone_id
        LEFT JOIN cameras c ON c.pole_id = p.id AND c.deleted_at IS NULL
        WHERE p.deleted_at IS NULL
        GROUP BY p.id
        ORDER BY p.id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(PoleRow {
            id: row.get(0)?,
            zone_id: row.get(1)?,
            zone_name: row.get(2)?,
            code: row.get(3)?,
            router_ip: row.get(4)?,
            router_vpn_ip: row.get(5)?,
            lat: row.get(6)?,
            lng: row.get(7)?,
            camera_count: row.get(8)?,
        })
    })?;

    rows.collect()
}

/// Every non-deleted camera attached to a pole, looked up by pole code.
pub fn cameras_by_pole(conn: &Connection, pole_code: &str) -> rusqlite::Result<Vec<CameraRow>> {
    let mut stmt = conn.prepare(
        "SELECT
            c.id,
            c.pole_id,
            p.code AS pole_code,
            c.ip AS camera_ip,
            c.number_of_parking
        FROM cameras c
        JOIN poles p ON p.id = c.pole_id AND p.deleted_at IS NULL
        WHERE p.code = ?1 AND c.deleted_at IS NULL
        ORDER BY c.id",
    )?;

    let rows = stmt.query_map([pole_code], |row| {
        Ok(CameraRow {
            id: row.get(0)?,
            pole_id: row.get(1)?,
            pole_code: row.get(2)?,
            camera_ip: row.get(3)?,
            number_of_parking: row.get(4)?,
        })
    })?;

    rows.collect()
}
