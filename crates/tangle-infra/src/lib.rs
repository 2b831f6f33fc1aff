//! Infrastructure implementations for Tangle.
//!
//! SQLite repositories (sqlx, split reader/writer WAL pools) implementing the
//! tangle-core repository traits, and the file-backed view-mode preference
//! store.

pub mod preference;
pub mod sqlite;
