use serde::{Deserialize, Serialize};

/// Direction of a sync run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Local library replaces the remote copy.
    Upload,
    /// Remote copy replaces the local library (local is backed up first).
    Download,
    /// Union of both, written back to both sides.
    Merge,
}

/// Outcome of a single sync run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncReport {
    pub mode: SyncMode,
    pub uploaded: usize,
    pub downloaded: usize,
    pub merged: usize,
    /// A remote document existed and was fetched, even if it held no bookmarks.
    #[serde(default)]
    pub remote_found: bool,
    /// The remote already held byte-identical content, so no PUT was issued.
    pub upload_skipped: bool,
    pub checksum: String,
    pub synced_at: String,
}

/// Persisted sync bookkeeping, surfaced to the front-end.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SyncStatus {
    pub configured: bool,
    pub last_synced_at: Option<String>,
    pub last_checksum: Option<String>,
    pub last_error: Option<String>,
}

/// Counts produced by merging two libraries.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MergeStats {
    /// Remote bookmarks appended to the local set.
    pub added: usize,
    /// Remote bookmarks folded into an existing local bookmark with the same URL.
    pub combined: usize,
    /// Remote bookmarks that needed a new id because theirs was taken.
    pub reassigned: usize,
    /// Folders created locally to hold remote paths.
    pub folders_created: usize,
}
