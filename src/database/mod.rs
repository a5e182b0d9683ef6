//! X Eyes database layer.
//!
//! SQLite connection management, schema migrations, and the key-value
//! table the background process persists extension data in.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use xeyes::database::{Database, SqliteStorage};
//!
//! let db = Arc::new(Database::open("xeyes.db").expect("failed to open database"));
//! let storage = SqliteStorage::new(db);
//! ```

pub mod connection;
pub mod kv_store;
pub mod migrations;

pub use connection::Database;
pub use kv_store::SqliteStorage;
