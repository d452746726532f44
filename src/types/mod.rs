// Shelfmark shared type definitions
// Each submodule defines types used across the application.

pub mod bookmark;
pub mod errors;
pub mod folder;
pub mod library;
pub mod settings;
pub mod stats;
pub mod sync;
pub mod tag;
pub mod view;
