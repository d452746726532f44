//! Library statistics shown in the dashboard header.

use chrono::{DateTime, Duration, Utc};

use crate::services::filter_engine::{added_at, RECENT_WINDOW_DAYS};
use crate::services::tag_index::compute_tags;
use crate::types::folder;
use crate::types::library::Library;
use crate::types::stats::Stats;

/// Recomputes every aggregate from scratch.
pub fn compute(library: &Library, now: DateTime<Utc>) -> Stats {
    let since = now - Duration::days(RECENT_WINDOW_DAYS);
    let bookmarks = &library.bookmarks;

    let most_visited = bookmarks
        .iter()
        .filter(|b| b.visited > 0)
        .max_by(|a, b| a.visited.cmp(&b.visited).then(b.id.cmp(&a.id)))
        .map(|b| b.id);

    Stats {
        total_bookmarks: bookmarks.len(),
        favorites: bookmarks.iter().filter(|b| b.favorite).count(),
        folders: folder::count(&library.folders),
        tags: compute_tags(bookmarks).len(),
        total_visits: bookmarks.iter().map(|b| b.visited).sum(),
        added_this_week: bookmarks
            .iter()
            .filter(|b| added_at(b).map_or(false, |d| d >= since))
            .count(),
        untagged: bookmarks.iter().filter(|b| b.tags.is_empty()).count(),
        most_visited,
    }
}
