//! Chat container types.
//!
//! A `Chat` anchors a message graph. It has exactly one owner for its whole
//! lifetime; ownership never transfers. Chats are created on the first user
//! message and are never hard-deleted by this subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A conversation owned by a single user.
///
/// The title starts as `None` and is filled in by the title synthesizer
/// until a non-default title is set (first non-default wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Lightweight chat listing entry returned by "list my chats".
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ChatSummary {
    pub id: Uuid,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Total messages across all branches of the graph.
    pub message_count: u32,
}

impl From<&Chat> for ChatSummary {
    fn from(chat: &Chat) -> Self {
        Self {
            id: chat.id,
            title: chat.title.clone(),
            created_at: chat.created_at,
            message_count: 0,
        }
    }
}
