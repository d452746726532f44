//! Tag index for Shelfmark.
//!
//! Tags live only on bookmarks; this module derives the tag list with counts
//! and colours, and applies library-wide rename/delete.

use crate::managers::bookmark_manager::normalize_tags;
use crate::types::bookmark::Bookmark;
use crate::types::library::Library;
use crate::types::tag::{same_tag, Tag};

const TAG_PALETTE: &[&str] = &[
    "#0969da", "#1a7f37", "#9a6700", "#cf222e", "#8250df",
    "#bf3989", "#0a7ea4", "#bc4c00", "#57606a", "#116329",
];

/// Deterministic display colour for a tag, independent of case.
pub fn tag_color(name: &str) -> String {
    // FNV-1a over the lower-cased name
    let hash = name
        .to_lowercase()
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325u64, |h, b| {
            (h ^ b as u64).wrapping_mul(0x0100_0000_01b3)
        });
    TAG_PALETTE[(hash % TAG_PALETTE.len() as u64) as usize].to_string()
}

/// Counts tag usage across bookmarks.
///
/// Tags are grouped case-insensitively; the first spelling seen is kept.
/// Sorted by count descending, then name.
pub fn compute_tags(bookmarks: &[Bookmark]) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::new();
    for bookmark in bookmarks {
        for name in &bookmark.tags {
            match tags.iter_mut().find(|t| same_tag(&t.name, name)) {
                Some(tag) => tag.count += 1,
                None => tags.push(Tag {
                    name: name.clone(),
                    count: 1,
                    color: tag_color(name),
                }),
            }
        }
    }
    tags.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    tags
}

/// Renames a tag on every bookmark. If a bookmark already carries `to`, the
/// two collapse into one. Returns the number of bookmarks touched.
pub fn rename_tag(library: &mut Library, from: &str, to: &str) -> usize {
    let to = to.trim();
    if to.is_empty() || from.trim().is_empty() {
        return 0;
    }
    let mut touched = 0;
    for bookmark in library.bookmarks.iter_mut().filter(|b| b.has_tag(from)) {
        let renamed: Vec<String> = bookmark
            .tags
            .iter()
            .map(|t| {
                if same_tag(t, from) {
                    to.to_string()
                } else {
                    t.clone()
                }
            })
            .collect();
        bookmark.tags = normalize_tags(&renamed);
        touched += 1;
    }
    touched
}

/// Removes a tag from every bookmark. Returns the number of bookmarks touched.
pub fn delete_tag(library: &mut Library, name: &str) -> usize {
    let mut touched = 0;
    for bookmark in library.bookmarks.iter_mut().filter(|b| b.has_tag(name)) {
        bookmark.tags.retain(|t| !same_tag(t, name));
        touched += 1;
    }
    touched
}
