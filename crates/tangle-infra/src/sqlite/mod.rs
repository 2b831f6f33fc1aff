//! SQLite persistence layer.

pub mod chat;
pub mod collab;
pub mod message;
pub mod pool;

pub(crate) mod row;
