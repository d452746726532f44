//! Folder tree type and the recursive walks over it.
//!
//! Folders form a forest: root folders have `parent = None` and each folder
//! owns its children. Ids are unique across the whole forest. Bookmarks refer
//! to folders by path (names joined with `/`), not by id.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Separator between folder names in a path.
pub const PATH_SEPARATOR: char = '/';

/// Represents a folder for organizing bookmarks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Folder {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub parent: Option<u64>,
    #[serde(default)]
    pub children: Vec<Folder>,
}

impl Folder {
    pub fn new(id: u64, name: &str, parent: Option<u64>) -> Self {
        Self {
            id,
            name: name.to_string(),
            parent,
            children: Vec::new(),
        }
    }
}

/// A folder flattened out of the tree, in pre-order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlatFolder {
    pub id: u64,
    pub name: String,
    pub path: String,
    pub depth: usize,
    pub parent: Option<u64>,
}

/// Collapses repeated and surrounding separators: `"/a//b/ "` becomes `"a/b"`.
pub fn normalize_path(path: &str) -> String {
    path.split(PATH_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Joins a parent path and a folder name.
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", parent, PATH_SEPARATOR, name)
    }
}

/// Returns the parent portion of a path (empty for root-level paths).
pub fn parent_path(path: &str) -> String {
    match path.rfind(PATH_SEPARATOR) {
        Some(idx) => path[..idx].to_string(),
        None => String::new(),
    }
}

/// Returns true if a bookmark stored under `folder` is visible when filtering
/// by `filter`: exact match or any descendant path. An empty filter matches all.
pub fn path_matches(folder: &str, filter: &str) -> bool {
    if filter.is_empty() {
        return true;
    }
    folder == filter
        || (folder.len() > filter.len()
            && folder.starts_with(filter)
            && folder[filter.len()..].starts_with(PATH_SEPARATOR))
}

/// Rewrites `path` from under `old_prefix` to under `new_prefix`.
///
/// Returns `None` when `path` is not `old_prefix` or one of its descendants.
pub fn rebase_path(path: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    if old_prefix.is_empty() || !path_matches(path, old_prefix) {
        return None;
    }
    let rest = path[old_prefix.len()..].trim_start_matches(PATH_SEPARATOR);
    if rest.is_empty() {
        Some(new_prefix.to_string())
    } else {
        Some(join_path(new_prefix, rest))
    }
}

/// Checks that a folder name is usable as a path segment.
pub fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty() && !name.contains(PATH_SEPARATOR)
}

/// Finds a folder anywhere in the tree.
pub fn find(folders: &[Folder], id: u64) -> Option<&Folder> {
    for folder in folders {
        if folder.id == id {
            return Some(folder);
        }
        if let Some(found) = find(&folder.children, id) {
            return Some(found);
        }
    }
    None
}

/// Finds a folder anywhere in the tree, mutably.
pub fn find_mut(folders: &mut [Folder], id: u64) -> Option<&mut Folder> {
    for folder in folders.iter_mut() {
        if folder.id == id {
            return Some(folder);
        }
        if let Some(found) = find_mut(&mut folder.children, id) {
            return Some(found);
        }
    }
    None
}

/// Returns the slash-joined path of names from the root to `id`.
pub fn path_of(folders: &[Folder], id: u64) -> Option<String> {
    fn walk(folders: &[Folder], id: u64, prefix: &str) -> Option<String> {
        for folder in folders {
            let path = join_path(prefix, &folder.name);
            if folder.id == id {
                return Some(path);
            }
            if let Some(found) = walk(&folder.children, id, &path) {
                return Some(found);
            }
        }
        None
    }
    walk(folders, id, "")
}

/// Resolves a path to its folder by walking names level by level.
pub fn find_by_path<'a>(folders: &'a [Folder], path: &str) -> Option<&'a Folder> {
    let path = normalize_path(path);
    if path.is_empty() {
        return None;
    }
    let mut level = folders;
    let mut current = None;
    for segment in path.split(PATH_SEPARATOR) {
        let next = level.iter().find(|f| f.name == segment)?;
        level = &next.children;
        current = Some(next);
    }
    current
}

/// Largest id in the tree, or 0 for an empty tree.
pub fn max_id(folders: &[Folder]) -> u64 {
    folders
        .iter()
        .map(|f| f.id.max(max_id(&f.children)))
        .max()
        .unwrap_or(0)
}

/// Total number of folders at every level.
pub fn count(folders: &[Folder]) -> usize {
    folders.iter().map(|f| 1 + count(&f.children)).sum()
}

/// Flattens the tree in pre-order, carrying depth and path.
pub fn flatten(folders: &[Folder]) -> Vec<FlatFolder> {
    fn walk(folders: &[Folder], prefix: &str, depth: usize, out: &mut Vec<FlatFolder>) {
        for folder in folders {
            let path = join_path(prefix, &folder.name);
            out.push(FlatFolder {
                id: folder.id,
                name: folder.name.clone(),
                path: path.clone(),
                depth,
                parent: folder.parent,
            });
            walk(&folder.children, &path, depth + 1, out);
        }
    }
    let mut out = Vec::new();
    walk(folders, "", 0, &mut out);
    out
}

/// Removes the folder (with its subtree) from wherever it lives in the tree.
pub fn detach(folders: &mut Vec<Folder>, id: u64) -> Option<Folder> {
    if let Some(pos) = folders.iter().position(|f| f.id == id) {
        return Some(folders.remove(pos));
    }
    for folder in folders.iter_mut() {
        if let Some(found) = detach(&mut folder.children, id) {
            return Some(found);
        }
    }
    None
}

/// Returns true if `candidate` lives somewhere below `ancestor`.
pub fn is_descendant(folders: &[Folder], ancestor: u64, candidate: u64) -> bool {
    find(folders, ancestor)
        .map(|a| find(&a.children, candidate).is_some())
        .unwrap_or(false)
}

/// Checks the tree invariants: unique ids, consistent parent links, valid
/// names that are unique among siblings.
pub fn validate(folders: &[Folder]) -> Result<(), String> {
    fn walk(
        folders: &[Folder],
        parent: Option<u64>,
        seen: &mut HashSet<u64>,
    ) -> Result<(), String> {
        let mut names = HashSet::new();
        for folder in folders {
            if !seen.insert(folder.id) {
                return Err(format!("duplicate folder id {}", folder.id));
            }
            if folder.parent != parent {
                return Err(format!(
                    "folder {} has parent {:?}, expected {:?}",
                    folder.id, folder.parent, parent
                ));
            }
            if !is_valid_name(&folder.name) {
                return Err(format!("folder {} has invalid name '{}'", folder.id, folder.name));
            }
            if !names.insert(folder.name.as_str()) {
                return Err(format!("duplicate sibling folder name '{}'", folder.name));
            }
            walk(&folder.children, Some(folder.id), seen)?;
        }
        Ok(())
    }
    walk(folders, None, &mut HashSet::new())
}
