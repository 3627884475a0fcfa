use rusqlite_migration::{Migrations, M};

/// Define all schema migrations.
/// Uses SQLite user_version pragma for tracking — no migration table needed.
pub fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        M::up(
            "-- Migration 1: catalog and accounts

CREATE TABLE zones (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    deleted_at TEXT
);

CREATE TABLE poles (
    id INTEGER PRIMARY KEY,
    zone_id INTEGER NOT NULL,
    code TEXT NOT NULL UNIQUE,
    router_ip TEXT NOT NULL DEFAULT '',
    router_vpn_ip TEXT,
    lat REAL,
    lng REAL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    deleted_at TEXT,
    FOREIGN KEY (zone_id) REFERENCES zones(id)
);

CREATE INDEX idx_poles_code ON poles(code);

CREATE TABLE cameras (
    id INTEGER PRIMARY KEY,
    pole_id INTEGER NOT NULL,
    ip TEXT NOT NULL,
    number_of_parking INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    deleted_at TEXT,
    FOREIGN KEY (pole_id) REFERENCES poles(id)
);

CREATE INDEX idx_cameras_pole ON cameras(pole_id);

CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    designation TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    deleted_at TEXT
);

CREATE TABLE permissions (
    id INTEGER PRIMARY KEY,
    key TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    description TEXT
);

CREATE TABLE user_permissions (
    user_id INTEGER NOT NULL,
    permission_id INTEGER NOT NULL,
    PRIMARY KEY (user_id, permission_id),
    FOREIGN KEY (user_id) REFERENCES users(id),
    FOREIGN KEY (permission_id) REFERENCES permissions(id)
);

INSERT INTO permissions (key, name, description) VALUES
    ('view_notification', 'View notifications', 'Receive disconnect and operator alerts');
",
        ),
        M::up(
            "-- Migration 2: persisted notifications

CREATE TABLE notifications (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL,
    pole_router_ip TEXT NOT NULL DEFAULT '',
    pole_code TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL,
    note TEXT NOT NULL DEFAULT '',
    is_read INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE INDEX idx_notifications_user ON notifications(user_id);
",
        ),
    ])
}
