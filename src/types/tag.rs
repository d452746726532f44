use serde::{Deserialize, Serialize};

/// A tag with its usage count across the library.
///
/// Tags are not stored on their own; they are derived from bookmark tag lists
/// whenever they are needed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    pub name: String,
    pub count: usize,
    pub color: String,
}

/// Tag names compare by their Unicode lowercase form, so "Über" and "über"
/// are the same tag.
pub fn same_tag(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
