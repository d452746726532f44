//! Folder Manager for Shelfmark.
//!
//! Implements `FolderManagerTrait`: create, rename, move and delete folders
//! in the library's folder tree. Bookmarks reference folders by path, so every
//! structural change also rewrites the `folder` field of affected bookmarks.

use crate::types::errors::FolderError;
use crate::types::folder::{self, FlatFolder, Folder};
use crate::types::library::Library;

/// Trait defining folder tree operations.
pub trait FolderManagerTrait {
    fn create_folder(&mut self, name: &str, parent: Option<u64>) -> Result<u64, FolderError>;
    fn rename_folder(&mut self, id: u64, name: &str) -> Result<(), FolderError>;
    fn move_folder(&mut self, id: u64, new_parent: Option<u64>) -> Result<(), FolderError>;
    /// Deletes the folder and its subtree. Returns how many bookmarks were re-homed.
    fn delete_folder(&mut self, id: u64) -> Result<usize, FolderError>;
    fn ensure_path(&mut self, path: &str) -> Result<Option<u64>, FolderError>;
    fn folder_path(&self, id: u64) -> Result<String, FolderError>;
    fn find_by_path(&self, path: &str) -> Option<&Folder>;
    fn tree(&self) -> &[Folder];
    fn flatten(&self) -> Vec<FlatFolder>;
}

/// Folder manager operating on a borrowed library.
pub struct FolderManager<'a> {
    library: &'a mut Library,
}

impl<'a> FolderManager<'a> {
    /// Creates a new `FolderManager` over the provided library.
    pub fn new(library: &'a mut Library) -> Self {
        Self { library }
    }

    fn next_id(&self) -> u64 {
        folder::max_id(&self.library.folders) + 1
    }

    /// Returns the children list a new folder under `parent` would join.
    fn siblings(&self, parent: Option<u64>) -> Result<&[Folder], FolderError> {
        match parent {
            None => Ok(&self.library.folders),
            Some(pid) => folder::find(&self.library.folders, pid)
                .map(|f| f.children.as_slice())
                .ok_or(FolderError::ParentNotFound(pid)),
        }
    }

    fn siblings_mut(&mut self, parent: Option<u64>) -> Result<&mut Vec<Folder>, FolderError> {
        match parent {
            None => Ok(&mut self.library.folders),
            Some(pid) => folder::find_mut(&mut self.library.folders, pid)
                .map(|f| &mut f.children)
                .ok_or(FolderError::ParentNotFound(pid)),
        }
    }

    fn check_name(&self, name: &str, parent: Option<u64>, exclude: Option<u64>) -> Result<String, FolderError> {
        if !folder::is_valid_name(name) {
            return Err(FolderError::InvalidName(name.to_string()));
        }
        let name = name.trim().to_string();
        let clash = self
            .siblings(parent)?
            .iter()
            .any(|f| f.name == name && Some(f.id) != exclude);
        if clash {
            return Err(FolderError::DuplicateName(name));
        }
        Ok(name)
    }

    /// Rewrites bookmark folder paths under `old` to live under `new`.
    fn rebase_bookmarks(&mut self, old: &str, new: &str) -> usize {
        let mut touched = 0;
        for bookmark in self.library.bookmarks.iter_mut() {
            if let Some(rebased) = folder::rebase_path(&bookmark.folder, old, new) {
                bookmark.folder = rebased;
                touched += 1;
            }
        }
        touched
    }
}

impl<'a> FolderManagerTrait for FolderManager<'a> {
    /// Creates a folder under `parent` (or at the root). Returns its ID.
    fn create_folder(&mut self, name: &str, parent: Option<u64>) -> Result<u64, FolderError> {
        let name = self.check_name(name, parent, None)?;
        let id = self.next_id();
        self.siblings_mut(parent)?.push(Folder::new(id, &name, parent));
        Ok(id)
    }

    fn rename_folder(&mut self, id: u64, name: &str) -> Result<(), FolderError> {
        let current = folder::find(&self.library.folders, id).ok_or(FolderError::NotFound(id))?;
        let parent = current.parent;
        let name = self.check_name(name, parent, Some(id))?;
        let old_path = self.folder_path(id)?;

        if let Some(target) = folder::find_mut(&mut self.library.folders, id) {
            target.name = name;
        }
        let new_path = self.folder_path(id)?;
        self.rebase_bookmarks(&old_path, &new_path);
        Ok(())
    }

    fn move_folder(&mut self, id: u64, new_parent: Option<u64>) -> Result<(), FolderError> {
        let current = folder::find(&self.library.folders, id).ok_or(FolderError::NotFound(id))?;
        let name = current.name.clone();
        if current.parent == new_parent {
            return Ok(());
        }
        if let Some(pid) = new_parent {
            if pid == id || folder::is_descendant(&self.library.folders, id, pid) {
                return Err(FolderError::InvalidMove(format!(
                    "folder {} cannot be moved into itself or its descendant {}",
                    id, pid
                )));
            }
        }
        self.check_name(&name, new_parent, Some(id))?;
        let old_path = self.folder_path(id)?;

        let mut subtree = folder::detach(&mut self.library.folders, id)
            .ok_or(FolderError::NotFound(id))?;
        subtree.parent = new_parent;
        self.siblings_mut(new_parent)?.push(subtree);

        let new_path = self.folder_path(id)?;
        self.rebase_bookmarks(&old_path, &new_path);
        Ok(())
    }

    /// Bookmarks anywhere under the deleted folder move to its parent folder.
    fn delete_folder(&mut self, id: u64) -> Result<usize, FolderError> {
        let old_path = self.folder_path(id)?;
        folder::detach(&mut self.library.folders, id).ok_or(FolderError::NotFound(id))?;

        let parent_path = folder::parent_path(&old_path);
        let mut moved = 0;
        for bookmark in self.library.bookmarks.iter_mut() {
            if folder::path_matches(&bookmark.folder, &old_path) {
                bookmark.folder = parent_path.clone();
                moved += 1;
            }
        }
        Ok(moved)
    }

    /// Creates any missing folders along `path`. Returns the leaf ID, or
    /// `None` for the root path.
    fn ensure_path(&mut self, path: &str) -> Result<Option<u64>, FolderError> {
        let path = folder::normalize_path(path);
        let mut parent: Option<u64> = None;
        for segment in path.split(folder::PATH_SEPARATOR).filter(|s| !s.is_empty()) {
            let existing = self
                .siblings(parent)?
                .iter()
                .find(|f| f.name == segment)
                .map(|f| f.id);
            parent = Some(match existing {
                Some(id) => id,
                None => self.create_folder(segment, parent)?,
            });
        }
        Ok(parent)
    }

    fn folder_path(&self, id: u64) -> Result<String, FolderError> {
        folder::path_of(&self.library.folders, id).ok_or(FolderError::NotFound(id))
    }

    fn find_by_path(&self, path: &str) -> Option<&Folder> {
        folder::find_by_path(&self.library.folders, path)
    }

    fn tree(&self) -> &[Folder] {
        &self.library.folders
    }

    fn flatten(&self) -> Vec<FlatFolder> {
        folder::flatten(&self.library.folders)
    }
}
