//! Storage Service for Shelfmark.
//!
//! Persists the library as a single JSON document in SQLite, keeps a rolling
//! set of backup snapshots, and handles JSON import/export. Every write is a
//! whole-document replace; there is no per-record versioning.

use chrono::Utc;
use log::{info, warn};
use ring::digest;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::managers::folder_manager::{FolderManager, FolderManagerTrait};
use crate::services::sync_service::merge_libraries;
use crate::types::errors::StorageError;
use crate::types::folder;
use crate::types::library::Library;
use crate::types::sync::{MergeStats, SyncStatus};

/// Key of the primary document row.
pub const PRIMARY_KEY: &str = "library";

/// Sync bookkeeping keys in `sync_state`.
pub const SYNC_LAST_CHECKSUM: &str = "last_checksum";
pub const SYNC_LAST_SYNCED_AT: &str = "last_synced_at";
pub const SYNC_LAST_ERROR: &str = "last_error";

/// Where `load` found the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "backup_id", rename_all = "snake_case")]
pub enum LoadSource {
    /// Nothing stored yet.
    Empty,
    Primary,
    /// The primary copy was missing or unreadable; recovered from this backup.
    Backup(String),
    /// No copy was readable. The damaged primary was moved to this backup row
    /// and the library started empty.
    Quarantined(String),
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub library: Library,
    pub source: LoadSource,
}

/// Metadata of one backup snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupInfo {
    pub id: String,
    pub checksum: String,
    pub bookmark_count: usize,
    /// Milliseconds since the UNIX epoch.
    pub created_at: i64,
}

/// How an imported document is combined with the current library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    Replace,
    Merge,
}

/// Hex SHA-256 of a byte slice.
pub fn checksum(bytes: &[u8]) -> String {
    digest::digest(&digest::SHA256, bytes)
        .as_ref()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Checksum of the library content, ignoring the `savedAt` stamp so that
/// re-saving unchanged data yields the same value.
pub fn content_checksum(library: &Library) -> Result<String, StorageError> {
    let mut unstamped = library.clone();
    unstamped.saved_at = None;
    Ok(checksum(serialize_library(&unstamped)?.as_bytes()))
}

/// Serializes a library to compact JSON.
pub fn serialize_library(library: &Library) -> Result<String, StorageError> {
    serde_json::to_string(library).map_err(|e| StorageError::SerializationError(e.to_string()))
}

/// Parses a library document. Only JSON shape is checked here.
pub fn parse_library(text: &str) -> Result<Library, StorageError> {
    serde_json::from_str(text).map_err(|e| StorageError::SerializationError(e.to_string()))
}

/// Brings an externally produced library in line with the local invariants:
/// folder tree must validate, bookmark folders are created if missing, and
/// duplicate bookmark ids are reassigned.
pub fn repair_library(mut library: Library) -> Result<Library, StorageError> {
    folder::validate(&library.folders).map_err(StorageError::InvalidDocument)?;

    let paths: Vec<String> = library
        .bookmarks
        .iter()
        .map(|b| folder::normalize_path(&b.folder))
        .collect();
    {
        let mut folders = FolderManager::new(&mut library);
        for path in paths.iter().filter(|p| !p.is_empty()) {
            folders
                .ensure_path(path)
                .map_err(|e| StorageError::InvalidDocument(e.to_string()))?;
        }
    }

    let mut next_id = library.max_bookmark_id() + 1;
    let mut seen = std::collections::HashSet::new();
    for (bookmark, path) in library.bookmarks.iter_mut().zip(paths) {
        bookmark.folder = path;
        if bookmark.id == 0 || !seen.insert(bookmark.id) {
            bookmark.id = next_id;
            seen.insert(next_id);
            next_id += 1;
        }
    }
    Ok(library)
}

/// Trait defining local persistence operations.
pub trait StorageServiceTrait {
    fn load(&self) -> Result<LoadOutcome, StorageError>;
    /// Stamps `saved_at` and replaces the primary document. Returns the content checksum.
    fn save(&self, library: &mut Library) -> Result<String, StorageError>;
    fn primary_checksum(&self) -> Result<Option<String>, StorageError>;
    /// Returns `None` when the newest backup already holds identical content.
    fn create_backup(&self, library: &Library) -> Result<Option<BackupInfo>, StorageError>;
    fn list_backups(&self) -> Result<Vec<BackupInfo>, StorageError>;
    /// Snapshots `current`, then makes backup `id` the primary document.
    /// The backup being restored survives the pruning that snapshot triggers.
    fn restore_backup(&self, id: &str, current: &Library) -> Result<Library, StorageError>;
    /// Moves an unreadable primary document into the backups table verbatim.
    /// Returns the backup id, or `None` when there is no primary row.
    fn quarantine_primary(&self) -> Result<Option<String>, StorageError>;
    fn export_json(&self, library: &Library) -> Result<String, StorageError>;
    fn import_json(
        &self,
        current: &Library,
        text: &str,
        mode: ImportMode,
    ) -> Result<(Library, MergeStats), StorageError>;
    fn get_sync_value(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_sync_value(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn clear_sync_value(&self, key: &str) -> Result<(), StorageError>;
    fn sync_status(&self, configured: bool) -> Result<SyncStatus, StorageError>;
}

/// Storage service backed by a SQLite connection.
pub struct StorageService<'a> {
    conn: &'a Connection,
    max_backups: usize,
}

impl<'a> StorageService<'a> {
    /// Creates a new `StorageService` using the provided database connection.
    pub fn new(conn: &'a Connection, max_backups: usize) -> Self {
        Self {
            conn,
            max_backups: max_backups.max(1),
        }
    }

    fn now_millis() -> i64 {
        Utc::now().timestamp_millis()
    }

    fn write_primary(&self, body: &str, checksum: &str) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO documents (key, body, checksum, updated_at) VALUES (?1, ?2, ?3, ?4)",
                params![PRIMARY_KEY, body, checksum, Self::now_millis()],
            )
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn read_primary_body(&self) -> Result<Option<String>, StorageError> {
        self.conn
            .query_row(
                "SELECT body FROM documents WHERE key = ?1",
                params![PRIMARY_KEY],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StorageError::DatabaseError(e.to_string()))
    }

    fn read_backup_body(&self, id: &str) -> Result<Option<String>, StorageError> {
        self.conn
            .query_row("SELECT body FROM backups WHERE id = ?1", params![id], |row| row.get(0))
            .optional()
            .map_err(|e| StorageError::DatabaseError(e.to_string()))
    }

    /// Walks backups newest first and returns the first one that parses.
    fn recover_from_backups(&self) -> Result<Option<(Library, String)>, StorageError> {
        for info in self.list_backups()? {
            let Some(body) = self.read_backup_body(&info.id)? else {
                continue;
            };
            match parse_library(&body) {
                Ok(library) => return Ok(Some((library, info.id))),
                Err(e) => warn!("backup {} is unreadable: {}", info.id, e),
            }
        }
        Ok(None)
    }

    /// Keeps the newest `max_backups` rows, plus `keep` if given.
    fn prune_backups(&self, keep: Option<&str>) -> Result<usize, StorageError> {
        self.conn
            .execute(
                "DELETE FROM backups WHERE id IS NOT ?2 AND id NOT IN \
                 (SELECT id FROM backups ORDER BY created_at DESC, rowid DESC LIMIT ?1)",
                params![self.max_backups as i64, keep],
            )
            .map_err(|e| StorageError::DatabaseError(e.to_string()))
    }

    fn snapshot(&self, library: &Library, keep: Option<&str>) -> Result<Option<BackupInfo>, StorageError> {
        let sum = content_checksum(library)?;
        let newest = self.list_backups()?.into_iter().next();
        if newest.map_or(false, |b| b.checksum == sum) {
            return Ok(None);
        }

        let info = BackupInfo {
            id: Uuid::new_v4().to_string(),
            checksum: sum,
            bookmark_count: library.bookmarks.len(),
            created_at: Self::now_millis(),
        };
        let body = serialize_library(library)?;
        self.insert_backup(&info, &body)?;

        let pruned = self.prune_backups(keep)?;
        if pruned > 0 {
            info!("pruned {} old backup(s)", pruned);
        }
        Ok(Some(info))
    }

    fn insert_backup(&self, info: &BackupInfo, body: &str) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO backups (id, body, checksum, created_at, bookmark_count) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![info.id, body, info.checksum, info.created_at, info.bookmark_count as i64],
            )
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

impl<'a> StorageServiceTrait for StorageService<'a> {
    /// Loads the primary document, falling back to the newest readable backup
    /// when the primary row is missing or fails to parse.
    fn load(&self) -> Result<LoadOutcome, StorageError> {
        let body = self.read_primary_body()?;

        let failure = match body {
            Some(body) => match parse_library(&body) {
                Ok(library) => {
                    return Ok(LoadOutcome {
                        library,
                        source: LoadSource::Primary,
                    })
                }
                Err(e) => {
                    warn!("primary library document is unreadable: {}", e);
                    Some(e)
                }
            },
            None => None,
        };

        match self.recover_from_backups()? {
            Some((library, backup_id)) => {
                info!("library restored from backup {}", backup_id);
                let body = serialize_library(&library)?;
                self.write_primary(&body, &content_checksum(&library)?)?;
                Ok(LoadOutcome {
                    library,
                    source: LoadSource::Backup(backup_id),
                })
            }
            None => match failure {
                Some(e) => Err(StorageError::Corrupted(e.to_string())),
                None => Ok(LoadOutcome {
                    library: Library::default(),
                    source: LoadSource::Empty,
                }),
            },
        }
    }

    fn save(&self, library: &mut Library) -> Result<String, StorageError> {
        library.saved_at = Some(Utc::now().to_rfc3339());
        let sum = content_checksum(library)?;
        let body = serialize_library(library)?;
        self.write_primary(&body, &sum)?;
        Ok(sum)
    }

    fn primary_checksum(&self) -> Result<Option<String>, StorageError> {
        self.conn
            .query_row(
                "SELECT checksum FROM documents WHERE key = ?1",
                params![PRIMARY_KEY],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StorageError::DatabaseError(e.to_string()))
    }

    fn create_backup(&self, library: &Library) -> Result<Option<BackupInfo>, StorageError> {
        self.snapshot(library, None)
    }

    /// Lists backups, newest first.
    fn list_backups(&self) -> Result<Vec<BackupInfo>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, checksum, bookmark_count, created_at FROM backups \
                 ORDER BY created_at DESC, rowid DESC",
            )
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                let count: i64 = row.get(2)?;
                Ok(BackupInfo {
                    id: row.get(0)?,
                    checksum: row.get(1)?,
                    bookmark_count: count.max(0) as usize,
                    created_at: row.get(3)?,
                })
            })
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| StorageError::DatabaseError(e.to_string()))?);
        }
        Ok(results)
    }

    fn restore_backup(&self, id: &str, current: &Library) -> Result<Library, StorageError> {
        let body = self
            .read_backup_body(id)?
            .ok_or_else(|| StorageError::BackupNotFound(id.to_string()))?;
        let library = parse_library(&body)?;

        self.snapshot(current, Some(id))?;
        self.write_primary(&body, &content_checksum(&library)?)?;
        info!("restored backup {}", id);
        Ok(library)
    }

    fn quarantine_primary(&self) -> Result<Option<String>, StorageError> {
        let body = self.read_primary_body()?;
        let Some(body) = body else {
            return Ok(None);
        };

        let info = BackupInfo {
            id: Uuid::new_v4().to_string(),
            checksum: checksum(body.as_bytes()),
            bookmark_count: 0,
            created_at: Self::now_millis(),
        };
        self.insert_backup(&info, &body)?;
        self.conn
            .execute("DELETE FROM documents WHERE key = ?1", params![PRIMARY_KEY])
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;
        warn!("unreadable library document kept as backup {}", info.id);
        Ok(Some(info.id))
    }

    fn export_json(&self, library: &Library) -> Result<String, StorageError> {
        serde_json::to_string_pretty(library)
            .map_err(|e| StorageError::SerializationError(e.to_string()))
    }

    /// Parses and repairs an external document, then either replaces the
    /// current library or merges into it. Nothing is written here.
    fn import_json(
        &self,
        current: &Library,
        text: &str,
        mode: ImportMode,
    ) -> Result<(Library, MergeStats), StorageError> {
        let incoming = parse_library(text)
            .map_err(|e| StorageError::InvalidDocument(e.to_string()))?;
        let incoming = repair_library(incoming)?;
        match mode {
            ImportMode::Replace => {
                let stats = MergeStats {
                    added: incoming.bookmarks.len(),
                    ..Default::default()
                };
                Ok((incoming, stats))
            }
            ImportMode::Merge => Ok(merge_libraries(current, &incoming)),
        }
    }

    fn get_sync_value(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.conn
            .query_row("SELECT value FROM sync_state WHERE key = ?1", params![key], |row| row.get(0))
            .optional()
            .map_err(|e| StorageError::DatabaseError(e.to_string()))
    }

    fn set_sync_value(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO sync_state (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![key, value, Self::now_millis()],
            )
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn clear_sync_value(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM sync_state WHERE key = ?1", params![key])
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn sync_status(&self, configured: bool) -> Result<SyncStatus, StorageError> {
        Ok(SyncStatus {
            configured,
            last_synced_at: self.get_sync_value(SYNC_LAST_SYNCED_AT)?,
            last_checksum: self.get_sync_value(SYNC_LAST_CHECKSUM)?,
            last_error: self.get_sync_value(SYNC_LAST_ERROR)?,
        })
    }
}
