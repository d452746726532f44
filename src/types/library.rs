use serde::{Deserialize, Serialize};

use super::bookmark::Bookmark;
use super::folder::Folder;

/// Current format version of the persisted document.
pub const LIBRARY_FORMAT_VERSION: u32 = 1;

/// The whole persisted document: every bookmark plus the folder tree.
///
/// This is the unit that is saved, backed up, exported and synced. Writes
/// always replace the entire document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

fn default_version() -> u32 {
    LIBRARY_FORMAT_VERSION
}

impl Default for Library {
    fn default() -> Self {
        Self {
            version: LIBRARY_FORMAT_VERSION,
            bookmarks: Vec::new(),
            folders: Vec::new(),
            saved_at: None,
        }
    }
}

impl Library {
    /// Largest bookmark id in use, or 0 when empty.
    pub fn max_bookmark_id(&self) -> u64 {
        self.bookmarks.iter().map(|b| b.id).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty() && self.folders.is_empty()
    }
}
