use shelfmark::types::errors::*;

// === BookmarkError Tests ===

#[test]
fn bookmark_error_display_variants() {
    assert_eq!(BookmarkError::NotFound(42).to_string(), "Bookmark not found: 42");
    assert_eq!(
        BookmarkError::FolderNotFound("Work/Rust".to_string()).to_string(),
        "Folder not found: Work/Rust"
    );
    assert_eq!(
        BookmarkError::InvalidUrl("javascript:alert(1)".to_string()).to_string(),
        "Invalid bookmark URL: javascript:alert(1)"
    );
    assert_eq!(
        BookmarkError::InvalidInput("screenshot is empty".to_string()).to_string(),
        "Invalid bookmark input: screenshot is empty"
    );
}

#[test]
fn bookmark_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(BookmarkError::NotFound(1));
    assert!(err.source().is_none());
}

// === FolderError Tests ===

#[test]
fn folder_error_display_variants() {
    assert_eq!(FolderError::NotFound(3).to_string(), "Folder not found: 3");
    assert_eq!(FolderError::ParentNotFound(9).to_string(), "Parent folder not found: 9");
    assert_eq!(
        FolderError::DuplicateName("Work".to_string()).to_string(),
        "Folder already exists: Work"
    );
    assert_eq!(
        FolderError::InvalidName("a/b".to_string()).to_string(),
        "Invalid folder name: 'a/b'"
    );
    assert_eq!(
        FolderError::InvalidMove("into itself".to_string()).to_string(),
        "Invalid folder move: into itself"
    );
}

// === StorageError Tests ===

#[test]
fn storage_error_display_variants() {
    assert_eq!(
        StorageError::DatabaseError("disk full".to_string()).to_string(),
        "Storage database error: disk full"
    );
    assert_eq!(
        StorageError::SerializationError("eof".to_string()).to_string(),
        "Storage serialization error: eof"
    );
    assert_eq!(
        StorageError::Corrupted("bad json".to_string()).to_string(),
        "Stored library is corrupted: bad json"
    );
    assert_eq!(
        StorageError::BackupNotFound("abc".to_string()).to_string(),
        "Backup not found: abc"
    );
    assert_eq!(
        StorageError::InvalidDocument("cycle".to_string()).to_string(),
        "Invalid library document: cycle"
    );
}

// === SyncError Tests ===

#[test]
fn sync_error_display_variants() {
    assert_eq!(SyncError::NotConfigured.to_string(), "Sync is not configured");
    assert_eq!(SyncError::AuthFailed.to_string(), "WebDAV authentication failed");
    assert_eq!(
        SyncError::NetworkError("timeout".to_string()).to_string(),
        "Sync network error: timeout"
    );
    assert_eq!(SyncError::HttpStatus(507).to_string(), "WebDAV server returned HTTP 507");
    assert_eq!(
        SyncError::SerializationError("eof".to_string()).to_string(),
        "Sync serialization error: eof"
    );
}

#[test]
fn sync_error_from_storage_error() {
    let err: SyncError = StorageError::BackupNotFound("x".to_string()).into();
    assert_eq!(err.to_string(), "Sync storage error: Backup not found: x");
}

// === ShortcutError Tests ===

#[test]
fn shortcut_error_display_variants() {
    assert_eq!(
        ShortcutError::NotFound("search".to_string()).to_string(),
        "Shortcut not found for action: search"
    );
    assert_eq!(
        ShortcutError::Conflict("Ctrl+K".to_string()).to_string(),
        "Shortcut conflict: Ctrl+K"
    );
    assert_eq!(
        ShortcutError::InvalidKeys("Ctrl+".to_string()).to_string(),
        "Invalid shortcut keys: Ctrl+"
    );
}

// === SettingsError Tests ===

#[test]
fn settings_error_display_variants() {
    assert_eq!(
        SettingsError::IoError("denied".to_string()).to_string(),
        "Settings I/O error: denied"
    );
    assert_eq!(
        SettingsError::SerializationError("eof".to_string()).to_string(),
        "Settings serialization error: eof"
    );
    assert_eq!(
        SettingsError::InvalidKey("x.y".to_string()).to_string(),
        "Invalid settings key: x.y"
    );
    assert_eq!(
        SettingsError::InvalidValue("not a bool".to_string()).to_string(),
        "Invalid settings value: not a bool"
    );
}
