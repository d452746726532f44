//! Bookmark Manager for Shelfmark.
//!
//! Implements `BookmarkManagerTrait`: CRUD operations for bookmarks over the
//! in-memory `Library` document. Persistence is handled separately by the
//! storage service; callers mark the library dirty after a mutation.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use reqwest::Url;

use crate::types::bookmark::{Bookmark, BookmarkDraft};
use crate::types::errors::BookmarkError;
use crate::types::folder::{self, path_matches};
use crate::types::library::Library;
use crate::types::tag::same_tag;

/// Trait defining bookmark management operations.
pub trait BookmarkManagerTrait {
    fn add_bookmark(&mut self, draft: BookmarkDraft) -> Result<u64, BookmarkError>;
    fn update_bookmark(&mut self, id: u64, draft: BookmarkDraft) -> Result<(), BookmarkError>;
    fn remove_bookmark(&mut self, id: u64) -> Result<Bookmark, BookmarkError>;
    fn get_bookmark(&self, id: u64) -> Result<&Bookmark, BookmarkError>;
    fn list_bookmarks(&self) -> &[Bookmark];
    fn toggle_favorite(&mut self, id: u64) -> Result<bool, BookmarkError>;
    fn record_visit(&mut self, id: u64) -> Result<u64, BookmarkError>;
    fn move_bookmark(&mut self, id: u64, folder: &str) -> Result<(), BookmarkError>;
    fn find_by_url(&self, url: &str) -> Option<&Bookmark>;
    fn bookmarks_in_folder(&self, path: &str, recursive: bool) -> Vec<&Bookmark>;
}

/// Bookmark manager operating on a borrowed library.
pub struct BookmarkManager<'a> {
    library: &'a mut Library,
}

impl<'a> BookmarkManager<'a> {
    /// Creates a new `BookmarkManager` over the provided library.
    pub fn new(library: &'a mut Library) -> Self {
        Self { library }
    }

    /// Returns the current time as an RFC 3339 string.
    fn now() -> String {
        Utc::now().to_rfc3339()
    }

    fn position(&self, id: u64) -> Result<usize, BookmarkError> {
        self.library
            .bookmarks
            .iter()
            .position(|b| b.id == id)
            .ok_or(BookmarkError::NotFound(id))
    }

    /// Normalises a folder path and checks it exists in the tree.
    fn resolve_folder(&self, raw: &str) -> Result<String, BookmarkError> {
        let path = folder::normalize_path(raw);
        if !path.is_empty() && folder::find_by_path(&self.library.folders, &path).is_none() {
            return Err(BookmarkError::FolderNotFound(path));
        }
        Ok(path)
    }
}

impl<'a> BookmarkManagerTrait for BookmarkManager<'a> {
    /// Adds a new bookmark. Returns the generated bookmark ID.
    fn add_bookmark(&mut self, draft: BookmarkDraft) -> Result<u64, BookmarkError> {
        let raw_url = draft
            .url
            .as_deref()
            .ok_or_else(|| BookmarkError::InvalidUrl(String::new()))?;
        let url = normalize_url(raw_url)?;
        let folder = self.resolve_folder(draft.folder.as_deref().unwrap_or(""))?;
        let screenshot = match draft.screenshot.as_deref() {
            Some(s) if !s.is_empty() => Some(validate_screenshot(s)?),
            _ => None,
        };

        let id = self.library.max_bookmark_id() + 1;
        let bookmark = Bookmark {
            id,
            title: title_or_host(draft.title.as_deref().unwrap_or(""), &url),
            url,
            description: draft.description.unwrap_or_default().trim().to_string(),
            tags: normalize_tags(&draft.tags.unwrap_or_default()),
            folder,
            date_added: Self::now(),
            visited: 0,
            favorite: draft.favorite.unwrap_or(false),
            screenshot,
        };
        self.library.bookmarks.push(bookmark);
        Ok(id)
    }

    /// Applies the fields present in `draft` to an existing bookmark.
    fn update_bookmark(&mut self, id: u64, draft: BookmarkDraft) -> Result<(), BookmarkError> {
        let idx = self.position(id)?;

        // Validate everything before touching the record
        let url = draft.url.as_deref().map(normalize_url).transpose()?;
        let folder = draft
            .folder
            .as_deref()
            .map(|f| self.resolve_folder(f))
            .transpose()?;
        let screenshot = match draft.screenshot.as_deref() {
            Some("") => Some(None),
            Some(s) => Some(Some(validate_screenshot(s)?)),
            None => None,
        };

        let bookmark = &mut self.library.bookmarks[idx];
        if let Some(url) = url {
            bookmark.url = url;
        }
        if let Some(title) = draft.title {
            bookmark.title = title_or_host(&title, &bookmark.url);
        }
        if let Some(description) = draft.description {
            bookmark.description = description.trim().to_string();
        }
        if let Some(tags) = draft.tags {
            bookmark.tags = normalize_tags(&tags);
        }
        if let Some(folder) = folder {
            bookmark.folder = folder;
        }
        if let Some(favorite) = draft.favorite {
            bookmark.favorite = favorite;
        }
        if let Some(screenshot) = screenshot {
            bookmark.screenshot = screenshot;
        }
        Ok(())
    }

    /// Removes a bookmark by ID, returning the removed record.
    fn remove_bookmark(&mut self, id: u64) -> Result<Bookmark, BookmarkError> {
        let idx = self.position(id)?;
        Ok(self.library.bookmarks.remove(idx))
    }

    fn get_bookmark(&self, id: u64) -> Result<&Bookmark, BookmarkError> {
        self.library
            .bookmarks
            .iter()
            .find(|b| b.id == id)
            .ok_or(BookmarkError::NotFound(id))
    }

    fn list_bookmarks(&self) -> &[Bookmark] {
        &self.library.bookmarks
    }

    /// Flips the favorite flag and returns the new value.
    fn toggle_favorite(&mut self, id: u64) -> Result<bool, BookmarkError> {
        let idx = self.position(id)?;
        let bookmark = &mut self.library.bookmarks[idx];
        bookmark.favorite = !bookmark.favorite;
        Ok(bookmark.favorite)
    }

    /// Increments the visit counter and returns the new count.
    fn record_visit(&mut self, id: u64) -> Result<u64, BookmarkError> {
        let idx = self.position(id)?;
        let bookmark = &mut self.library.bookmarks[idx];
        bookmark.visited = bookmark.visited.saturating_add(1);
        Ok(bookmark.visited)
    }

    /// Moves a bookmark to a different folder path (empty for unfiled).
    fn move_bookmark(&mut self, id: u64, folder: &str) -> Result<(), BookmarkError> {
        let idx = self.position(id)?;
        let folder = self.resolve_folder(folder)?;
        self.library.bookmarks[idx].folder = folder;
        Ok(())
    }

    /// Finds an existing bookmark pointing at the same normalised URL.
    fn find_by_url(&self, url: &str) -> Option<&Bookmark> {
        let key = url_key(url);
        self.library.bookmarks.iter().find(|b| url_key(&b.url) == key)
    }

    /// Lists bookmarks stored in `path`, optionally including subfolders.
    fn bookmarks_in_folder(&self, path: &str, recursive: bool) -> Vec<&Bookmark> {
        let path = folder::normalize_path(path);
        self.library
            .bookmarks
            .iter()
            .filter(|b| {
                if recursive {
                    path_matches(&b.folder, &path)
                } else {
                    b.folder == path
                }
            })
            .collect()
    }
}

/// Validates a user-entered URL, prepending `https://` when no scheme is given.
///
/// The accepted string is returned as typed (trimmed), not re-serialised.
pub fn normalize_url(raw: &str) -> Result<String, BookmarkError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return Err(BookmarkError::InvalidUrl(raw.to_string()));
    }
    let candidate = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let parsed =
        Url::parse(&candidate).map_err(|_| BookmarkError::InvalidUrl(raw.to_string()))?;
    match parsed.scheme() {
        "http" | "https" | "ftp" => {
            if parsed.host_str().map_or(true, str::is_empty) {
                return Err(BookmarkError::InvalidUrl(raw.to_string()));
            }
        }
        "file" => {}
        _ => return Err(BookmarkError::InvalidUrl(raw.to_string())),
    }
    Ok(candidate)
}

/// True for `scheme:rest`; `host:8080` is a port, not a scheme.
fn has_scheme(s: &str) -> bool {
    let Some((head, rest)) = s.split_once(':') else {
        return false;
    };
    head.starts_with(|c: char| c.is_ascii_alphabetic())
        && head
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && !rest.starts_with(|c: char| c.is_ascii_digit())
}

/// Comparison key for duplicate detection: the normalised URL in parsed form,
/// no trailing slash. `example.com` and `https://example.com/` share a key.
pub fn url_key(url: &str) -> String {
    let normalized = normalize_url(url)
        .ok()
        .and_then(|u| Url::parse(&u).ok())
        .map(|parsed| parsed.to_string())
        .unwrap_or_else(|| url.trim().to_lowercase());
    normalized.trim_end_matches('/').to_string()
}

/// Returns the host portion of a URL, without a leading `www.`.
pub fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_default()
}

fn title_or_host(title: &str, url: &str) -> String {
    let title = title.trim();
    if !title.is_empty() {
        return title.to_string();
    }
    let host = host_of(url);
    if host.is_empty() {
        url.to_string()
    } else {
        host
    }
}

/// Trims tags, drops empties and removes case-insensitive duplicates,
/// keeping the first spelling and the original order.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || out.iter().any(|t| same_tag(t, tag)) {
            continue;
        }
        out.push(tag.to_string());
    }
    out
}

/// Splits a comma-separated tag field into normalised tags.
pub fn parse_tags(input: &str) -> Vec<String> {
    let raw: Vec<String> = input.split(',').map(str::to_string).collect();
    normalize_tags(&raw)
}

/// Accepts only `data:image/<fmt>;base64,<payload>` with a decodable payload.
pub fn validate_screenshot(data_url: &str) -> Result<String, BookmarkError> {
    let rest = data_url
        .strip_prefix("data:image/")
        .ok_or_else(|| BookmarkError::InvalidInput("screenshot must be an image data URL".to_string()))?;
    let (format, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| BookmarkError::InvalidInput("screenshot must be base64 encoded".to_string()))?;
    if format.is_empty() || payload.is_empty() {
        return Err(BookmarkError::InvalidInput("screenshot is empty".to_string()));
    }
    BASE64
        .decode(payload)
        .map_err(|e| BookmarkError::InvalidInput(format!("screenshot payload: {}", e)))?;
    Ok(data_url.to_string())
}
