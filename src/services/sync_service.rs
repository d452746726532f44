//! Sync Service for Shelfmark.
//!
//! Mirrors the library to a WebDAV server as one JSON document. There is no
//! conflict protocol: upload and download replace the whole document, and
//! merge takes the union of both sides and writes it back.

use chrono::Utc;
use log::{info, warn};

use crate::managers::bookmark_manager::{normalize_tags, url_key};
use crate::managers::folder_manager::{FolderManager, FolderManagerTrait};
use crate::services::storage_service::{content_checksum, parse_library, repair_library};
use crate::services::webdav_client::WebDavClient;
use crate::types::errors::SyncError;
use crate::types::folder;
use crate::types::library::Library;
use crate::types::settings::SyncSettings;
use crate::types::sync::{MergeStats, SyncMode, SyncReport};

/// Name of the mirrored document inside the remote directory.
pub const REMOTE_FILE: &str = "bookmarks.json";

/// Merges `remote` into `local`.
///
/// - Folder paths from the remote tree are created locally if missing.
/// - A remote bookmark whose URL is already present locally is folded into
///   the local one: higher visit count, favorite if either is, union of tags,
///   and remote description/screenshot only where the local one is empty.
/// - Any other remote bookmark is appended; it gets a fresh id if its id is
///   already taken.
///
/// Merging a library with itself changes nothing.
pub fn merge_libraries(local: &Library, remote: &Library) -> (Library, MergeStats) {
    let mut merged = local.clone();
    let mut stats = MergeStats::default();
    let folders_before = folder::count(&merged.folders);

    {
        let mut folders = FolderManager::new(&mut merged);
        for flat in folder::flatten(&remote.folders) {
            if let Err(e) = folders.ensure_path(&flat.path) {
                warn!("remote folder '{}' not merged: {}", flat.path, e);
            }
        }
    }

    let mut next_id = merged.max_bookmark_id().max(remote.max_bookmark_id()) + 1;
    for incoming in &remote.bookmarks {
        let key = url_key(&incoming.url);
        if let Some(existing) = merged.bookmarks.iter_mut().find(|b| url_key(&b.url) == key) {
            let before = existing.clone();
            existing.visited = existing.visited.max(incoming.visited);
            existing.favorite |= incoming.favorite;
            let mut tags = existing.tags.clone();
            tags.extend(incoming.tags.iter().cloned());
            existing.tags = normalize_tags(&tags);
            if existing.description.is_empty() {
                existing.description = incoming.description.clone();
            }
            if existing.screenshot.is_none() {
                existing.screenshot = incoming.screenshot.clone();
            }
            if *existing != before {
                stats.combined += 1;
            }
            continue;
        }

        let mut bookmark = incoming.clone();
        let path = folder::normalize_path(&bookmark.folder);
        bookmark.folder = match FolderManager::new(&mut merged).ensure_path(&path) {
            Ok(_) => path,
            Err(e) => {
                warn!("bookmark {} filed at the root, folder '{}' unusable: {}", bookmark.url, path, e);
                String::new()
            }
        };
        if bookmark.id == 0 || merged.bookmarks.iter().any(|b| b.id == bookmark.id) {
            bookmark.id = next_id;
            next_id += 1;
            stats.reassigned += 1;
        }
        merged.bookmarks.push(bookmark);
        stats.added += 1;
    }

    stats.folders_created = folder::count(&merged.folders) - folders_before;
    (merged, stats)
}

/// Sync service bound to one WebDAV client and remote directory.
pub struct SyncService {
    client: WebDavClient,
    remote_dir: String,
}

impl SyncService {
    pub fn new(client: WebDavClient, remote_dir: &str) -> Self {
        Self {
            client,
            remote_dir: folder::normalize_path(remote_dir),
        }
    }

    /// Builds the service from settings, or `NotConfigured`.
    pub fn from_settings(settings: &SyncSettings) -> Result<Self, SyncError> {
        let client = WebDavClient::from_settings(settings)?;
        Ok(Self::new(client, &settings.remote_path))
    }

    /// Path of the mirrored document relative to the server base URL.
    pub fn remote_file(&self) -> String {
        folder::join_path(&self.remote_dir, REMOTE_FILE)
    }

    /// Checks that the base collection is reachable with these credentials.
    pub async fn test_connection(&self) -> Result<bool, SyncError> {
        self.client.propfind("").await
    }

    /// Fetches the remote document exactly as stored, without repairs.
    async fn fetch_remote(&self) -> Result<Option<Library>, SyncError> {
        let Some(bytes) = self.client.get(&self.remote_file()).await? else {
            return Ok(None);
        };
        let text = String::from_utf8(bytes)
            .map_err(|e| SyncError::SerializationError(e.to_string()))?;
        let library = parse_library(&text)
            .map_err(|e| SyncError::SerializationError(e.to_string()))?;
        Ok(Some(library))
    }

    /// Fetches and parses the remote document. `None` if nothing was uploaded yet.
    pub async fn download(&self) -> Result<Option<Library>, SyncError> {
        match self.fetch_remote().await? {
            Some(library) => repair_library(library)
                .map(Some)
                .map_err(|e| SyncError::SerializationError(e.to_string())),
            None => Ok(None),
        }
    }

    /// Replaces the remote document with `library`.
    ///
    /// Returns `true` when the upload was skipped because the remote content
    /// is already identical.
    pub async fn upload(&self, library: &Library) -> Result<bool, SyncError> {
        let local_sum = content_checksum(library)?;
        // Compared as stored: a document that only matches after repair is rewritten
        if let Ok(Some(remote)) = self.fetch_remote().await {
            if content_checksum(&remote)? == local_sum {
                return Ok(true);
            }
        }

        self.client.ensure_collection(&self.remote_dir).await?;
        let body = serde_json::to_vec_pretty(library)
            .map_err(|e| SyncError::SerializationError(e.to_string()))?;
        self.client.put(&self.remote_file(), body).await?;
        info!("uploaded {} bookmark(s) to {}", library.bookmarks.len(), self.remote_file());
        Ok(false)
    }

    /// Runs one sync in the given mode and returns the resulting local library.
    ///
    /// The caller persists the returned library; for `Download` it should back
    /// up the current local copy first.
    pub async fn sync(&self, local: &Library, mode: SyncMode) -> Result<(Library, SyncReport), SyncError> {
        let mut report = SyncReport {
            mode,
            uploaded: 0,
            downloaded: 0,
            merged: 0,
            remote_found: false,
            upload_skipped: false,
            checksum: String::new(),
            synced_at: String::new(),
        };

        let result = match mode {
            SyncMode::Upload => {
                report.upload_skipped = self.upload(local).await?;
                if !report.upload_skipped {
                    report.uploaded = local.bookmarks.len();
                }
                local.clone()
            }
            SyncMode::Download => match self.download().await? {
                Some(remote) => {
                    report.remote_found = true;
                    report.downloaded = remote.bookmarks.len();
                    remote
                }
                None => {
                    info!("remote document {} does not exist yet", self.remote_file());
                    local.clone()
                }
            },
            SyncMode::Merge => {
                let merged = match self.download().await? {
                    Some(remote) => {
                        report.remote_found = true;
                        report.downloaded = remote.bookmarks.len();
                        let (merged, stats) = merge_libraries(local, &remote);
                        report.merged = stats.added + stats.combined;
                        merged
                    }
                    None => local.clone(),
                };
                report.upload_skipped = self.upload(&merged).await?;
                if !report.upload_skipped {
                    report.uploaded = merged.bookmarks.len();
                }
                merged
            }
        };

        report.checksum = content_checksum(&result)?;
        report.synced_at = Utc::now().to_rfc3339();
        Ok((result, report))
    }
}
