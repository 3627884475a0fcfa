//! Permission resolution and notification persistence for the alerting
//! pipeline.

use rusqlite::{params, Connection};

use crate::alerts::Alert;

/// Active, non-deleted users holding a permission key.
pub fn active_user_ids_with_permission(
    conn: &Connection,
    key: &str,
) -> rusqlite::Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT u.id
        FROM users u
        JOIN user_permissions up ON up.user_id = u.id
        JOIN permissions p ON p.id = up.permission_id
        WHERE u.active = 1 AND u.deleted_at IS NULL AND p.key = ?1
        ORDER BY u.id",
    )?;

    let ids = stmt.query_map([key], |row| row.get(0))?;
    ids.collect()
}

/// Fan one alert out as a notification row per recipient. Returns the
/// number of rows written.
pub fn write_notifications(
    conn: &Connection,
    user_ids: &[i64],
    alert: &Alert,
) -> rusqlite::Result<usize> {
    let created_at = chrono::Utc::now().to_rfc3339();
    let mut stmt = conn.prepare(
        "INSERT INTO notifications
            (user_id, pole_router_ip, pole_code, description, note, is_read, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
    )?;

    for user_id in user_ids {
        stmt.execute(params![
            user_id,
            alert.pole_router_ip,
            alert.pole_code,
            alert.title,
            alert.note,
            created_at,
        ])?;
    }

    Ok(user_ids.len())
}
