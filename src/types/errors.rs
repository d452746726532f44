use std::fmt;

// === BookmarkError ===

/// Errors related to bookmark management operations.
#[derive(Debug, PartialEq)]
pub enum BookmarkError {
    /// Bookmark with the given ID was not found.
    NotFound(u64),
    /// The target folder path does not exist in the folder tree.
    FolderNotFound(String),
    /// The URL could not be parsed or uses an unsupported scheme.
    InvalidUrl(String),
    /// Some other field failed validation.
    InvalidInput(String),
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkError::NotFound(id) => write!(f, "Bookmark not found: {}", id),
            BookmarkError::FolderNotFound(path) => write!(f, "Folder not found: {}", path),
            BookmarkError::InvalidUrl(url) => write!(f, "Invalid bookmark URL: {}", url),
            BookmarkError::InvalidInput(msg) => write!(f, "Invalid bookmark input: {}", msg),
        }
    }
}

impl std::error::Error for BookmarkError {}

// === FolderError ===

/// Errors related to the folder tree.
#[derive(Debug, PartialEq)]
pub enum FolderError {
    /// Folder with the given ID was not found.
    NotFound(u64),
    /// The requested parent folder does not exist.
    ParentNotFound(u64),
    /// A sibling folder already uses this name.
    DuplicateName(String),
    /// The folder name is empty or contains a path separator.
    InvalidName(String),
    /// The folder cannot be moved to the requested location.
    InvalidMove(String),
}

impl fmt::Display for FolderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FolderError::NotFound(id) => write!(f, "Folder not found: {}", id),
            FolderError::ParentNotFound(id) => write!(f, "Parent folder not found: {}", id),
            FolderError::DuplicateName(name) => write!(f, "Folder already exists: {}", name),
            FolderError::InvalidName(name) => write!(f, "Invalid folder name: '{}'", name),
            FolderError::InvalidMove(msg) => write!(f, "Invalid folder move: {}", msg),
        }
    }
}

impl std::error::Error for FolderError {}

// === StorageError ===

/// Errors related to local persistence, backups, import and export.
#[derive(Debug)]
pub enum StorageError {
    /// Database operation failed.
    DatabaseError(String),
    /// JSON serialization or deserialization failed.
    SerializationError(String),
    /// The primary document and every backup failed to parse.
    Corrupted(String),
    /// Backup with the given ID was not found.
    BackupNotFound(String),
    /// An imported document failed validation.
    InvalidDocument(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::DatabaseError(msg) => write!(f, "Storage database error: {}", msg),
            StorageError::SerializationError(msg) => {
                write!(f, "Storage serialization error: {}", msg)
            }
            StorageError::Corrupted(msg) => write!(f, "Stored library is corrupted: {}", msg),
            StorageError::BackupNotFound(id) => write!(f, "Backup not found: {}", id),
            StorageError::InvalidDocument(msg) => write!(f, "Invalid library document: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

// === SyncError ===

/// Errors related to WebDAV synchronisation.
#[derive(Debug)]
pub enum SyncError {
    /// Sync is disabled or the server URL is missing.
    NotConfigured,
    /// The server rejected the credentials.
    AuthFailed,
    /// Transport-level failure (DNS, TLS, connection reset, timeout).
    NetworkError(String),
    /// The server answered with an unexpected HTTP status.
    HttpStatus(u16),
    /// The remote document could not be parsed.
    SerializationError(String),
    /// Reading or writing local state failed.
    StorageError(String),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::NotConfigured => write!(f, "Sync is not configured"),
            SyncError::AuthFailed => write!(f, "WebDAV authentication failed"),
            SyncError::NetworkError(msg) => write!(f, "Sync network error: {}", msg),
            SyncError::HttpStatus(code) => write!(f, "WebDAV server returned HTTP {}", code),
            SyncError::SerializationError(msg) => {
                write!(f, "Sync serialization error: {}", msg)
            }
            SyncError::StorageError(msg) => write!(f, "Sync storage error: {}", msg),
        }
    }
}

impl std::error::Error for SyncError {}

impl From<StorageError> for SyncError {
    fn from(e: StorageError) -> Self {
        SyncError::StorageError(e.to_string())
    }
}

// === ShortcutError ===

/// Errors related to keyboard shortcut management.
#[derive(Debug)]
pub enum ShortcutError {
    /// Shortcut for the given action was not found.
    NotFound(String),
    /// The shortcut keys conflict with an existing binding.
    Conflict(String),
    /// The provided key combination is invalid.
    InvalidKeys(String),
}

impl fmt::Display for ShortcutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortcutError::NotFound(action) => {
                write!(f, "Shortcut not found for action: {}", action)
            }
            ShortcutError::Conflict(msg) => write!(f, "Shortcut conflict: {}", msg),
            ShortcutError::InvalidKeys(keys) => write!(f, "Invalid shortcut keys: {}", keys),
        }
    }
}

impl std::error::Error for ShortcutError {}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// I/O error reading or writing the settings file.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The settings key does not exist.
    InvalidKey(String),
    /// The value is not valid for the key.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => write!(f, "Invalid settings value: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {}
