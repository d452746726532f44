use serde::{Deserialize, Serialize};

/// Aggregate counts over the library. Derived on demand, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Stats {
    pub total_bookmarks: usize,
    pub favorites: usize,
    pub folders: usize,
    pub tags: usize,
    pub total_visits: u64,
    pub added_this_week: usize,
    pub untagged: usize,
    pub most_visited: Option<u64>,
}
