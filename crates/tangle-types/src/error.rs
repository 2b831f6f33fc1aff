use thiserror::Error;

/// Terminal, user-visible error taxonomy for graph and session operations.
///
/// None of these are retried by the core; each variant is surfaced
/// distinguishably so callers can render "not found" vs "forbidden"
/// differently. Transient storage retries belong to the storage layer.
#[derive(Debug, Error)]
pub enum ChatError {
    /// No valid identity on the request.
    #[error("unauthorized")]
    Unauthorized,

    /// Valid identity, insufficient authority.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Referenced chat/message/session missing or out of the caller's scope.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// State-machine violation, e.g. starting a second active session.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Malformed graph mutation, e.g. duplicate root or self-referential parent.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Storage failure bubbled up from a repository.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors from repository operations (used by trait definitions in tangle-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<RepositoryError> for ChatError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => ChatError::NotFound("entity"),
            RepositoryError::Conflict(msg) => ChatError::Conflict(msg),
            other => ChatError::Storage(other.to_string()),
        }
    }
}
