//! Observability setup for Tangle.

pub mod tracing_setup;
