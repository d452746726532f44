//! Tag suggestions for new bookmarks.
//!
//! A fixed keyword table matched against the title, URL and description.
//! No network access and no model behind it.

use crate::managers::bookmark_manager::host_of;

/// Maximum number of suggestions returned.
pub const MAX_SUGGESTIONS: usize = 5;

/// (keyword, tag) pairs. A keyword hit anywhere in the inputs suggests the tag.
const KEYWORD_TAGS: &[(&str, &str)] = &[
    ("github", "development"),
    ("gitlab", "development"),
    ("stackoverflow", "development"),
    ("rust", "rust"),
    ("python", "python"),
    ("javascript", "javascript"),
    ("typescript", "javascript"),
    ("docs", "documentation"),
    ("documentation", "documentation"),
    ("tutorial", "learning"),
    ("course", "learning"),
    ("youtube", "video"),
    ("vimeo", "video"),
    ("news", "news"),
    ("blog", "blog"),
    ("medium.com", "blog"),
    ("recipe", "cooking"),
    ("design", "design"),
    ("figma", "design"),
    ("shop", "shopping"),
    ("amazon", "shopping"),
    ("music", "music"),
    ("spotify", "music"),
    ("wikipedia", "reference"),
    ("arxiv", "research"),
    ("paper", "research"),
];

/// Suggests tags for a bookmark from its title, URL and description.
///
/// Keyword hits come first in table order, followed by the second-level
/// domain name of the URL (e.g. `rust-lang` for `www.rust-lang.org`).
pub fn suggest(title: &str, url: &str, description: &str) -> Vec<String> {
    let haystack = format!("{} {} {}", title, url, description).to_lowercase();
    let mut out: Vec<String> = Vec::new();

    for (keyword, tag) in KEYWORD_TAGS {
        if haystack.contains(keyword) && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }

    let host = host_of(url);
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() >= 2 {
        let domain = parts[parts.len() - 2].to_string();
        if !domain.is_empty() && !out.contains(&domain) {
            out.push(domain);
        }
    }

    out.truncate(MAX_SUGGESTIONS);
    out
}
