//! Collaboration session lifecycle: repository trait and manager.

pub mod manager;
pub mod repository;
