//! HTTP request handlers for the REST API.

pub mod chat;
pub mod collab;
pub mod message;
pub mod ws;
