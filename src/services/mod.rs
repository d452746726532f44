// Shelfmark services
// Services provide filtering, view building, persistence, sync and settings.

pub mod filter_engine;
pub mod scheduler;
pub mod settings_engine;
pub mod stats;
pub mod storage_service;
pub mod sync_service;
pub mod tag_index;
pub mod tag_suggester;
pub mod view_builder;
pub mod webdav_client;
