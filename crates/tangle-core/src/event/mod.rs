//! Event fan-out plumbing.

pub mod bus;
