//! Schema migrations for the Shelfmark SQLite database.
//!
//! Applied versions are recorded in `schema_version` with the time they ran,
//! so opening an existing library only runs the steps it is missing.

use chrono::Utc;
use rusqlite::{params, Connection};

/// Latest schema version known to this build.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Highest applied version, or 0 for a fresh file.
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Brings the library database up to [`CURRENT_SCHEMA_VERSION`].
///
/// Called on every open; already-applied steps are skipped.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    // WAL is not versioned; in-memory databases silently keep their own mode
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );"
    )?;

    let current = get_schema_version(conn);

    if current < 1 {
        migration_v1(conn)?;
        record_version(conn, 1, "Initial schema: documents and backups")?;
    }

    if current < 2 {
        migration_v2(conn)?;
        record_version(conn, 2, "Add sync_state, bookmark_count on backups")?;
    }

    Ok(())
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        params![version, Utc::now().timestamp(), description],
    )?;
    Ok(())
}

/// V1: primary document store and backup snapshots.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS documents (
            key TEXT PRIMARY KEY,
            body TEXT NOT NULL,
            checksum TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS backups (
            id TEXT PRIMARY KEY,
            body TEXT NOT NULL,
            checksum TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_backups_created_at ON backups(created_at);
        "
    )
}

/// V2: sync bookkeeping, plus a column older databases lack.
fn migration_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS sync_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        );
        "
    )?;
    if conn.prepare("SELECT bookmark_count FROM backups LIMIT 0").is_err() {
        conn.execute_batch(
            "ALTER TABLE backups ADD COLUMN bookmark_count INTEGER NOT NULL DEFAULT 0;"
        )?;
    }
    Ok(())
}
