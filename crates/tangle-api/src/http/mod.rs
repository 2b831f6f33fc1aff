//! HTTP/REST API layer for Tangle.
//!
//! Axum-based REST API at `/api/v1/` with token authentication, envelope
//! response format, CORS support, and a WebSocket event feed at `/ws/events`.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
