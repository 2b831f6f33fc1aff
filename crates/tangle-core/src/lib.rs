//! Business logic and repository trait definitions for Tangle.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements. It depends only on `tangle-types` -- never on
//! `tangle-infra` or any database/IO crate.

pub mod access;
pub mod chat;
pub mod collab;
pub mod event;
pub mod graph;
pub mod mode;

#[cfg(test)]
pub(crate) mod testing;
