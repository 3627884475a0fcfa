pub mod catalog;
pub mod migrations;
pub mod models;
pub mod notify;

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Type alias for the shared database connection.
/// rusqlite is synchronous — we wrap in Arc<Mutex> for thread safety
/// with tokio::task::spawn_blocking for DB operations.
pub type DbPool = Arc<Mutex<Connection>>;

/// Crate-wide boxed error for fallible paths that cross collaborator
/// boundaries (DB, spawned tasks, timeouts).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Initialize the SQLite database: create the data directory if needed,
/// open (or create) the database file, enable WAL mode, and run migrations.
pub fn init_db(data_dir: &str) -> Result<DbPool, BoxError> {
    std::fs::create_dir_all(data_dir)?;

    let db_path = Path::new(data_dir).join("polewatch.db");
    let mut conn = Connection::open(&db_path)?;

    // WAL for concurrent status reads while the alert pipeline writes
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    let migrations = migrations::migrations();
    migrations.to_latest(&mut conn)?;

    tracing::info!("database initialized at {}", db_path.display());

    Ok(Arc::new(Mutex::new(conn)))
}
