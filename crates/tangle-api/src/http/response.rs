//! Envelope response format for all API responses.
//!
//! Every success response is wrapped in a consistent envelope:
//! ```json
//! {
//!   "data": { ... },
//!   "meta": { "request_id": "...", "timestamp": "...", "response_time_ms": 5 },
//!   "_links": { "self": "..." }
//! }
//! ```
//!
//! Error responses use the same shape with an `errors` array instead of
//! `data`; they are produced by [`crate::http::error::ApiError`].

use std::collections::HashMap;
use std::time::Instant;

use serde::Serialize;
use uuid::Uuid;

/// Envelope response wrapping all API data.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// The main response payload.
    pub data: T,

    /// Request metadata.
    pub meta: ApiMeta,

    /// HATEOAS-style links for discoverability.
    #[serde(rename = "_links", skip_serializing_if = "HashMap::is_empty")]
    pub links: HashMap<String, String>,
}

/// Metadata included in every response.
#[derive(Debug, Serialize)]
pub struct ApiMeta {
    /// Unique request identifier for tracing.
    pub request_id: String,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
    /// Response time in milliseconds.
    pub response_time_ms: u64,
}

/// Per-request timing and id, created at the top of each handler.
pub struct RequestMeta {
    request_id: String,
    started: Instant,
}

impl RequestMeta {
    pub fn start() -> Self {
        Self {
            request_id: Uuid::now_v7().to_string(),
            started: Instant::now(),
        }
    }

    /// Wrap `data` in the envelope, stamping elapsed time.
    pub fn success<T: Serialize>(self, data: T) -> ApiResponse<T> {
        ApiResponse {
            data,
            meta: ApiMeta {
                request_id: self.request_id,
                timestamp: chrono::Utc::now().to_rfc3339(),
                response_time_ms: self.started.elapsed().as_millis() as u64,
            },
            links: HashMap::new(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Add a HATEOAS link.
    pub fn with_link(mut self, rel: &str, href: &str) -> Self {
        self.links.insert(rel.to_string(), href.to_string());
        self
    }
}
