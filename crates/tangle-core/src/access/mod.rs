//! Cross-cutting authorization checks.

pub mod guard;
