//! Chat container service, repository trait, and title synthesis.

pub mod repository;
pub mod service;
pub mod title;
