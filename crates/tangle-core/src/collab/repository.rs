//! SessionRepository trait definition.
//!
//! Persistence surface for collaboration sessions and their participant set.
//! `end_active` is the one conditional (compare-and-set) operation in the
//! system: the `Active -> Ended` transition must be linearizable with respect
//! to concurrent joins and writes.

use chrono::{DateTime, Utc};
use tangle_types::collab::CollaborationSession;
use tangle_types::error::RepositoryError;
use uuid::Uuid;

/// Outcome of a conditional participant insert.
///
/// `NotActive` is the losing side of the join/end race: the session was seen
/// active by the caller but had been ended by the time the insert ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantAdd {
    /// Newly recorded in an active session.
    Added,
    /// Already a participant; no change.
    AlreadyPresent,
    /// The session was not active at insert time; nothing recorded.
    NotActive,
}

/// Repository trait for collaboration session persistence.
///
/// Implementations live in tangle-infra (e.g. `SqliteSessionRepository`).
pub trait SessionRepository: Send + Sync {
    /// Insert a new session record.
    fn create_session(
        &self,
        session: &CollaborationSession,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a session by ID, with its participant set loaded.
    fn get_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<CollaborationSession>, RepositoryError>> + Send;

    /// The chat's currently active session, if one exists.
    fn get_active_for_chat(
        &self,
        chat_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<CollaborationSession>, RepositoryError>> + Send;

    /// Add a participant to a session. Idempotent.
    ///
    /// The insert must be conditioned on the session still being active in
    /// the same statement, so a join racing a concurrent end comes back as
    /// [`ParticipantAdd::NotActive`] instead of silently landing in an ended
    /// session's participant set.
    fn add_participant(
        &self,
        session_id: &Uuid,
        user_id: &Uuid,
        joined_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<ParticipantAdd, RepositoryError>> + Send;

    /// Remove a participant from a session. Idempotent.
    ///
    /// Returns `true` if the user was present and removed.
    fn remove_participant(
        &self,
        session_id: &Uuid,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Conditionally transition a session from Active to Ended.
    ///
    /// The update is scoped by session id, chat id, AND current status, so a
    /// mismatched chat, a missing session, and an already-ended session all
    /// affect zero rows. Returns `true` only when this call performed the
    /// transition.
    fn end_active(
        &self,
        session_id: &Uuid,
        chat_id: &Uuid,
        ended_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
