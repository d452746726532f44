//! Shelfmark database layer.
//!
//! The library document, its rolling backups and sync bookkeeping are kept in
//! one SQLite file. This module owns the connection and the versioned schema;
//! `services::storage_service` owns the queries.
//!
//! ```no_run
//! use shelfmark::database::Database;
//!
//! let db = Database::open("/tmp/shelfmark/shelfmark.db").expect("open library store");
//! assert!(db.schema_version() >= 1);
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
