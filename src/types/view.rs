use serde::{Deserialize, Serialize};

use super::bookmark::Bookmark;

/// Which subset of the library the main view shows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewScope {
    #[default]
    All,
    Favorites,
    /// Added within the last seven days.
    Recent,
    /// Visited at least once.
    MostVisited,
    Untagged,
}

/// Ordering applied to filtered bookmarks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    DateDesc,
    DateAsc,
    TitleAsc,
    TitleDesc,
    MostVisited,
}

/// Grid of cards or compact list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    Grid,
    List,
}

/// Search and filter criteria for the bookmark view.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BookmarkFilter {
    /// Case-insensitive substring over title, url, description and tags.
    pub query: String,
    /// Folder path; matches the folder itself and everything below it.
    pub folder: Option<String>,
    /// Every listed tag must be present on the bookmark.
    pub tags: Vec<String>,
    pub scope: ViewScope,
    pub sort: SortOrder,
    pub offset: usize,
    /// `None` returns everything after `offset`.
    pub limit: Option<usize>,
}

/// A page of filtered bookmarks plus the unpaginated match count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterResult {
    pub items: Vec<Bookmark>,
    pub total: usize,
}

/// Tag chip shown on a card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardTag {
    pub name: String,
    pub color: String,
}

/// Display model for one bookmark, drawn as-is by the front-end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookmarkCard {
    pub id: u64,
    pub title: String,
    pub url: String,
    pub domain: String,
    pub favicon_url: String,
    pub excerpt: String,
    pub tags: Vec<CardTag>,
    pub folder: String,
    pub favorite: bool,
    pub visited: u64,
    pub age_label: String,
    pub layout: Layout,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

/// Folder entry in the sidebar tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SidebarNode {
    pub id: u64,
    pub name: String,
    pub path: String,
    /// Bookmarks stored directly in this folder.
    pub direct_count: usize,
    /// Bookmarks in this folder and all of its descendants.
    pub total_count: usize,
    pub children: Vec<SidebarNode>,
}

/// The whole sidebar: folder tree plus the unfiled bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sidebar {
    pub folders: Vec<SidebarNode>,
    pub unfiled: usize,
    pub total: usize,
}
