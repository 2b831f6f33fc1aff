//! Shared domain types for Tangle.
//!
//! Pure data: chats, message graph nodes, collaboration sessions, view-mode
//! preferences, broadcast events, and the error taxonomy. No IO, no async.

pub mod chat;
pub mod collab;
pub mod error;
pub mod event;
pub mod message;
pub mod mode;
