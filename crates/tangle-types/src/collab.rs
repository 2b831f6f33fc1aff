//! Collaboration session types.
//!
//! A collaboration session is a time-bounded, owner-authorized window during
//! which non-owner participants may write to a chat's graph. At most one
//! session per chat is active at a time; the `Active -> Ended` transition is
//! one-way and terminal. Starting over means a new session record, never a
//! resurrection of an ended one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a collaboration session.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (status IN ('active', 'ended'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Ended,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::Ended => write!(f, "ended"),
        }
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(SessionStatus::Active),
            "ended" => Ok(SessionStatus::Ended),
            other => Err(format!("invalid session status: '{other}'")),
        }
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Active
    }
}

/// A live-editing window on a single chat.
///
/// `owner_id` always equals the owning chat's `owner_id`; only that user may
/// end the session. Participants are tracked in a separate join table and
/// carried here as a plain set of user ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaborationSession {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub owner_id: Uuid,
    pub status: SessionStatus,
    pub participant_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl CollaborationSession {
    /// Whether the session still accepts joins and collaborator writes.
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}
