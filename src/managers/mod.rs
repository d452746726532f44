// Shelfmark state managers
// Managers mutate the in-memory library and the shortcut bindings.

pub mod bookmark_manager;
pub mod folder_manager;
pub mod shortcut_manager;
