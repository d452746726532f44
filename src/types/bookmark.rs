use serde::{Deserialize, Serialize};

use crate::types::tag::same_tag;

/// Represents a saved bookmark.
///
/// `folder` is the slash-delimited path of the containing folder (empty for
/// unfiled bookmarks). It is matched against folder paths by string, so any
/// change to the folder tree has to rewrite it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: u64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub date_added: String,
    #[serde(default)]
    pub visited: u64,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

impl Bookmark {
    /// Returns true if the bookmark carries the tag (case-insensitive).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| same_tag(t, tag))
    }
}

/// Input for creating or patching a bookmark.
///
/// On create, `url` is required and missing fields take defaults. On update,
/// only the fields that are `Some` are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookmarkDraft {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub folder: Option<String>,
    pub favorite: Option<bool>,
    pub screenshot: Option<String>,
}

impl BookmarkDraft {
    /// Shorthand for the common "url + title" draft.
    pub fn new(url: &str, title: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    pub fn with_folder(mut self, folder: &str) -> Self {
        self.folder = Some(folder.to_string());
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = Some(tags.iter().map(|t| t.to_string()).collect());
        self
    }
}
