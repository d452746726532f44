//! SQLite connection management for Shelfmark.
//!
//! [`Database`] plays the role of the browser's local storage: it holds the
//! primary library document, its backup snapshots and sync bookkeeping.

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use super::migrations;

/// How long a writer waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the `rusqlite::Connection` and guarantees the schema is current.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database file, creating missing parent
    /// directories, and runs migrations.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the file cannot be opened or migrations fail.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                // Connection::open reports the real failure if this did not work
                let _ = std::fs::create_dir_all(parent);
            }
        }
        Self::init(Connection::open(path)?)
    }

    /// Opens a throwaway in-memory database; used by tests.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, rusqlite::Error> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    /// Schema version recorded in the database.
    pub fn schema_version(&self) -> i32 {
        migrations::get_schema_version(&self.conn)
    }

    /// Returns a reference to the underlying `rusqlite::Connection`.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
