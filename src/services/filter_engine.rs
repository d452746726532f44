//! Search and filter engine for the bookmark view.
//!
//! Filtering is a straight pass over the library: text query, folder path
//! prefix, required tags and view scope, then a stable sort and pagination.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};

use crate::types::bookmark::Bookmark;
use crate::types::folder::{normalize_path, path_matches};
use crate::types::view::{BookmarkFilter, FilterResult, SortOrder, ViewScope};

/// How far back the `Recent` scope reaches.
pub const RECENT_WINDOW_DAYS: i64 = 7;

/// Parses a bookmark's `date_added`; unparseable dates sort oldest.
pub fn added_at(bookmark: &Bookmark) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&bookmark.date_added)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Case-insensitive substring match over title, url, description and tags.
pub fn matches_query(bookmark: &Bookmark, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    bookmark.title.to_lowercase().contains(&query)
        || bookmark.url.to_lowercase().contains(&query)
        || bookmark.description.to_lowercase().contains(&query)
        || bookmark.tags.iter().any(|t| t.to_lowercase().contains(&query))
}

fn in_scope(bookmark: &Bookmark, scope: ViewScope, now: DateTime<Utc>) -> bool {
    match scope {
        ViewScope::All => true,
        ViewScope::Favorites => bookmark.favorite,
        ViewScope::Recent => added_at(bookmark)
            .map(|d| d >= now - Duration::days(RECENT_WINDOW_DAYS))
            .unwrap_or(false),
        ViewScope::MostVisited => bookmark.visited > 0,
        ViewScope::Untagged => bookmark.tags.is_empty(),
    }
}

fn compare(a: &Bookmark, b: &Bookmark, sort: SortOrder) -> Ordering {
    let primary = match sort {
        SortOrder::DateDesc => added_at(b).cmp(&added_at(a)),
        SortOrder::DateAsc => added_at(a).cmp(&added_at(b)),
        SortOrder::TitleAsc => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortOrder::TitleDesc => b.title.to_lowercase().cmp(&a.title.to_lowercase()),
        SortOrder::MostVisited => b.visited.cmp(&a.visited),
    };
    primary.then(a.id.cmp(&b.id))
}

/// Applies `filter` to `bookmarks` as of `now`.
///
/// `total` counts every match before `offset`/`limit` are applied.
pub fn apply(bookmarks: &[Bookmark], filter: &BookmarkFilter, now: DateTime<Utc>) -> FilterResult {
    let folder = filter.folder.as_deref().map(normalize_path).unwrap_or_default();

    let mut matched: Vec<&Bookmark> = bookmarks
        .iter()
        .filter(|b| path_matches(&b.folder, &folder))
        .filter(|b| filter.tags.iter().all(|t| b.has_tag(t.trim())))
        .filter(|b| in_scope(b, filter.scope, now))
        .filter(|b| matches_query(b, &filter.query))
        .collect();
    matched.sort_by(|a, b| compare(a, b, filter.sort));

    let total = matched.len();
    let items = matched
        .into_iter()
        .skip(filter.offset)
        .take(filter.limit.unwrap_or(usize::MAX))
        .cloned()
        .collect();

    FilterResult { items, total }
}
