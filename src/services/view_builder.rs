//! View models for the front-end.
//!
//! Turns filtered bookmarks into cards and the folder tree into a sidebar
//! with counts. The front-end draws these without further computation.

use chrono::{DateTime, Utc};

use crate::managers::bookmark_manager::host_of;
use crate::services::filter_engine::added_at;
use crate::services::tag_index::tag_color;
use crate::types::bookmark::Bookmark;
use crate::types::folder::{join_path, path_matches, Folder};
use crate::types::library::Library;
use crate::types::view::{BookmarkCard, CardTag, Layout, Sidebar, SidebarNode};

/// Longest description excerpt shown on a card, in characters.
pub const EXCERPT_LEN: usize = 140;

/// Favicon service URL for a host.
pub fn favicon_url(domain: &str) -> String {
    format!("https://www.google.com/s2/favicons?domain={}&sz=64", domain)
}

/// Shortens text to `max` characters on a word boundary, appending `…`.
pub fn excerpt(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    let trimmed = match cut.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}…", trimmed.trim_end())
}

/// Human label for how long ago a bookmark was added.
pub fn age_label(added: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(added) = added else {
        return String::new();
    };
    let days = (now - added).num_days().max(0);
    match days {
        0 => "today".to_string(),
        1 => "yesterday".to_string(),
        2..=13 => format!("{} days ago", days),
        14..=59 => format!("{} weeks ago", days / 7),
        60..=729 => format!("{} months ago", days / 30),
        _ => format!("{} years ago", days / 365),
    }
}

/// Builds the card for one bookmark.
pub fn card(bookmark: &Bookmark, layout: Layout, show_screenshots: bool, now: DateTime<Utc>) -> BookmarkCard {
    let domain = host_of(&bookmark.url);
    BookmarkCard {
        id: bookmark.id,
        title: bookmark.title.clone(),
        url: bookmark.url.clone(),
        favicon_url: favicon_url(&domain),
        domain,
        excerpt: excerpt(&bookmark.description, EXCERPT_LEN),
        tags: bookmark
            .tags
            .iter()
            .map(|t| CardTag {
                name: t.clone(),
                color: tag_color(t),
            })
            .collect(),
        folder: bookmark.folder.clone(),
        favorite: bookmark.favorite,
        visited: bookmark.visited,
        age_label: age_label(added_at(bookmark), now),
        layout,
        screenshot: if show_screenshots && layout == Layout::Grid {
            bookmark.screenshot.clone()
        } else {
            None
        },
    }
}

/// Builds cards for a page of bookmarks.
pub fn cards(
    bookmarks: &[Bookmark],
    layout: Layout,
    show_screenshots: bool,
    now: DateTime<Utc>,
) -> Vec<BookmarkCard> {
    bookmarks
        .iter()
        .map(|b| card(b, layout, show_screenshots, now))
        .collect()
}

fn sidebar_nodes(folders: &[Folder], prefix: &str, bookmarks: &[Bookmark]) -> Vec<SidebarNode> {
    folders
        .iter()
        .map(|f| {
            let path = join_path(prefix, &f.name);
            SidebarNode {
                id: f.id,
                name: f.name.clone(),
                direct_count: bookmarks.iter().filter(|b| b.folder == path).count(),
                total_count: bookmarks.iter().filter(|b| path_matches(&b.folder, &path)).count(),
                children: sidebar_nodes(&f.children, &path, bookmarks),
                path,
            }
        })
        .collect()
}

/// Builds the sidebar folder tree with per-folder bookmark counts.
pub fn sidebar(library: &Library) -> Sidebar {
    Sidebar {
        folders: sidebar_nodes(&library.folders, "", &library.bookmarks),
        unfiled: library.bookmarks.iter().filter(|b| b.folder.is_empty()).count(),
        total: library.bookmarks.len(),
    }
}
