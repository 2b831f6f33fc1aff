//! Broadcast events for real-time fan-out.
//!
//! Exactly one event is published per successful mutation: one
//! `MessageCreated` per graph write, one `SessionEnded` per successful end.
//! The transport that delivers these (WebSocket) is notification-only --
//! it never participates in authority decisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::Message;

/// Event emitted by the core after a successful mutation.
///
/// Serialized as a tagged JSON object, e.g.
/// `{"type":"session_ended","session_id":"...","chat_id":"..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A new root or branch message was written to a chat's graph.
    MessageCreated {
        chat_id: Uuid,
        message: Message,
    },
    /// A collaboration session was opened on a chat.
    SessionStarted {
        session_id: Uuid,
        chat_id: Uuid,
        owner_id: Uuid,
    },
    /// A participant joined an active session.
    ParticipantJoined {
        session_id: Uuid,
        chat_id: Uuid,
        user_id: Uuid,
    },
    /// A participant left a session.
    ParticipantLeft {
        session_id: Uuid,
        chat_id: Uuid,
        user_id: Uuid,
    },
    /// The owner ended a session; collaborator writes are rejected from here on.
    SessionEnded {
        session_id: Uuid,
        chat_id: Uuid,
        ended_at: DateTime<Utc>,
    },
}

impl ChatEvent {
    /// The chat this event belongs to, for per-chat fan-out filtering.
    pub fn chat_id(&self) -> Uuid {
        match self {
            ChatEvent::MessageCreated { chat_id, .. }
            | ChatEvent::SessionStarted { chat_id, .. }
            | ChatEvent::ParticipantJoined { chat_id, .. }
            | ChatEvent::ParticipantLeft { chat_id, .. }
            | ChatEvent::SessionEnded { chat_id, .. } => *chat_id,
        }
    }
}
