//! On-device storage for cinedeck.
//!
//! A string-keyed store of JSON snapshots (active user, registered users,
//! favorites, language). Backed by `rusqlite` (bundled `SQLite`), with an
//! in-memory implementation for tests and ephemeral sessions.

mod connection;
/// Key-value store trait and implementations.
pub mod kv;
mod migrations;
/// JSON snapshot helpers on top of a key-value store.
pub mod snapshot;

pub use kv::{KeyValueStore, MemoryStore, SqliteStore};
pub use snapshot::{load_json, save_json};
