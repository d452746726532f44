//! App Core for Shelfmark.
//!
//! Central struct holding the library, its store, settings and timers, and
//! managing the application lifecycle.

use std::time::{Duration, Instant};

use log::{info, warn};

use crate::database::connection::Database;
use crate::managers::shortcut_manager::ShortcutManager;
use crate::services::scheduler::{BackupTimer, SaveDebouncer};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::storage_service::{
    BackupInfo, LoadOutcome, LoadSource, StorageService, StorageServiceTrait, SYNC_LAST_CHECKSUM,
    SYNC_LAST_ERROR, SYNC_LAST_SYNCED_AT,
};
use crate::types::errors::{StorageError, SyncError};
use crate::types::library::Library;
use crate::types::settings::AppSettings;
use crate::types::sync::{SyncMode, SyncReport, SyncStatus};

/// What a call to [`App::tick`] did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    pub saved: bool,
    pub backup: Option<BackupInfo>,
}

/// Central application struct.
///
/// Managers borrow `&mut Library` and services borrow the connection, so they
/// are created on demand: `BookmarkManager::new(&mut app.library)`,
/// `app.storage()`.
pub struct App {
    pub db: Database,
    pub library: Library,
    pub settings_engine: SettingsEngine,
    pub shortcut_manager: ShortcutManager,
    pub load_source: LoadSource,
    debouncer: SaveDebouncer,
    backup_timer: BackupTimer,
    sync_requested: bool,
}

impl App {
    /// Opens the database, loads settings and the library.
    ///
    /// A missing settings file yields defaults; a malformed one is logged and
    /// replaced by defaults in memory. The library falls back to the newest
    /// readable backup when the primary copy is damaged. With no readable copy
    /// at all, the damaged document is kept as a backup row and the library
    /// starts empty.
    pub fn new(
        db_path: &str,
        settings_path: Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Database::open(db_path)?;

        let mut settings_engine = SettingsEngine::new(settings_path);
        if let Err(e) = settings_engine.load() {
            warn!("using default settings: {}", e);
        }
        let settings = settings_engine.get_settings().clone();

        let storage = StorageService::new(db.connection(), settings.storage.max_backups);
        let outcome = match storage.load() {
            Ok(outcome) => outcome,
            Err(StorageError::Corrupted(reason)) => {
                warn!("no readable library copy ({}), starting empty", reason);
                let source = match storage.quarantine_primary()? {
                    Some(id) => LoadSource::Quarantined(id),
                    None => LoadSource::Empty,
                };
                LoadOutcome {
                    library: Library::default(),
                    source,
                }
            }
            Err(e) => return Err(format!("library load failed: {}", e).into()),
        };
        info!(
            "loaded {} bookmark(s) from {:?}",
            outcome.library.bookmarks.len(),
            outcome.source
        );

        let now = Instant::now();
        Ok(Self {
            db,
            library: outcome.library,
            shortcut_manager: ShortcutManager::from_bindings(&settings.shortcuts),
            settings_engine,
            load_source: outcome.source,
            debouncer: SaveDebouncer::new(Duration::from_millis(settings.storage.save_debounce_ms)),
            backup_timer: BackupTimer::new(
                Duration::from_secs(settings.storage.backup_interval_secs),
                now,
            ),
            sync_requested: false,
        })
    }

    pub fn settings(&self) -> &AppSettings {
        self.settings_engine.get_settings()
    }

    /// Storage service bound to this app's connection.
    pub fn storage(&self) -> StorageService<'_> {
        StorageService::new(self.db.connection(), self.settings().storage.max_backups)
    }

    /// Re-reads timer settings and shortcut bindings after a settings change.
    pub fn apply_settings(&mut self) {
        let settings = self.settings().clone();
        self.debouncer
            .set_delay(Duration::from_millis(settings.storage.save_debounce_ms));
        self.backup_timer
            .set_interval(Duration::from_secs(settings.storage.backup_interval_secs));
        self.shortcut_manager = ShortcutManager::from_bindings(&settings.shortcuts);
    }

    /// Records an edit; the save happens once edits have been quiet for the
    /// configured debounce delay.
    pub fn mark_dirty(&mut self, now: Instant) {
        self.debouncer.request(now);
    }

    pub fn is_dirty(&self) -> bool {
        self.debouncer.is_pending()
    }

    fn persist(&mut self) -> Result<String, StorageError> {
        let sum = StorageService::new(self.db.connection(), self.settings().storage.max_backups)
            .save(&mut self.library)?;
        self.debouncer.clear();
        Ok(sum)
    }

    /// Saves immediately and, with auto-sync enabled, requests an upload.
    pub fn flush(&mut self) -> Result<String, StorageError> {
        let sum = self.persist()?;
        let sync = &self.settings().sync;
        if sync.auto_sync && sync.is_configured() {
            self.sync_requested = true;
        }
        Ok(sum)
    }

    /// Runs due timers: a debounced save, then a periodic backup.
    pub fn tick(&mut self, now: Instant) -> Result<TickReport, StorageError> {
        let mut report = TickReport::default();
        if self.debouncer.due(now) {
            self.flush()?;
            report.saved = true;
        }
        if self.backup_timer.due(now) {
            report.backup = self.create_backup()?;
            self.backup_timer.reset(now);
        }
        Ok(report)
    }

    /// Snapshots the in-memory library. `None` if the newest backup is identical.
    pub fn create_backup(&mut self) -> Result<Option<BackupInfo>, StorageError> {
        let created = self.storage().create_backup(&self.library)?;
        if let Some(info) = &created {
            info!("backup {} created ({} bookmarks)", info.id, info.bookmark_count);
        }
        Ok(created)
    }

    /// Makes a backup the current library and the primary document, keeping
    /// a snapshot of what it replaces.
    pub fn restore_backup(&mut self, id: &str) -> Result<(), StorageError> {
        self.library = self.storage().restore_backup(id, &self.library)?;
        self.debouncer.clear();
        Ok(())
    }

    /// Swaps in a whole new library (import replace/merge), keeping a backup of
    /// the previous content, and saves.
    pub fn replace_library(&mut self, library: Library) -> Result<String, StorageError> {
        self.create_backup()?;
        self.library = library;
        self.flush()
    }

    /// Returns and clears a pending auto-sync request.
    pub fn take_sync_request(&mut self) -> bool {
        std::mem::take(&mut self.sync_requested)
    }

    /// Adopts the library returned by a sync run and records its bookkeeping.
    ///
    /// A download that fetched a remote document replaces local data, so the
    /// local copy is backed up first, even when the remote library is empty.
    /// Saving here never requests another sync.
    pub fn apply_sync_result(
        &mut self,
        library: Library,
        report: &SyncReport,
    ) -> Result<(), StorageError> {
        if report.mode == SyncMode::Download && report.remote_found {
            self.create_backup()?;
        }
        self.library = library;
        self.persist()?;

        let storage = self.storage();
        storage.set_sync_value(SYNC_LAST_CHECKSUM, &report.checksum)?;
        storage.set_sync_value(SYNC_LAST_SYNCED_AT, &report.synced_at)?;
        storage.clear_sync_value(SYNC_LAST_ERROR)?;
        Ok(())
    }

    pub fn record_sync_error(&self, error: &SyncError) {
        warn!("sync failed: {}", error);
        if let Err(e) = self.storage().set_sync_value(SYNC_LAST_ERROR, &error.to_string()) {
            warn!("could not record sync error: {}", e);
        }
    }

    pub fn sync_status(&self) -> Result<SyncStatus, StorageError> {
        self.storage()
            .sync_status(self.settings().sync.is_configured())
    }

    /// Shutdown sequence: flush pending edits and take a final backup.
    pub fn shutdown(&mut self) -> Result<(), StorageError> {
        if self.is_dirty() {
            self.persist()?;
        }
        self.create_backup()?;
        info!("shut down with {} bookmark(s)", self.library.bookmarks.len());
        Ok(())
    }
}
