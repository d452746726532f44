//! Shelfmark: a bookmark organizer with a folder tree, path-based filtering,
//! local persistence with rolling backups, and an optional WebDAV mirror.
//!
//! This library crate exposes all modules for use by the RPC binary and the
//! integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
