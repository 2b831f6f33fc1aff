//! Message graph store: repository trait and invariant-enforcing service.

pub mod repository;
pub mod store;
