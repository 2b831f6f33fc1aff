//! Message graph node types.
//!
//! Messages form a tree per chat: exactly one root (`parent_id = None`),
//! any node may have multiple children (a branch point, e.g. the same prompt
//! fanned out to several models). Messages are immutable once created --
//! corrections are new branches, never in-place edits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Who authored a message.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (role IN ('user', 'assistant'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single node in a chat's message graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Uuid,
    /// `None` only for the chat's root message.
    pub parent_id: Option<Uuid>,
    pub role: MessageRole,
    pub content: String,
    /// Which language model produced this message (assistant messages only).
    pub model: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Set when written by a collaborator rather than the chat owner.
    pub author_user_id: Option<Uuid>,
}

impl Message {
    /// Whether this message is its chat's root node.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [MessageRole::User, MessageRole::Assistant] {
            let s = role.to_string();
            let parsed: MessageRole = s.parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let parsed: MessageRole = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, MessageRole::Assistant);
    }

    #[test]
    fn test_role_parse_rejects_unknown() {
        assert!("system".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_is_root() {
        let root = Message {
            id: Uuid::now_v7(),
            chat_id: Uuid::now_v7(),
            parent_id: None,
            role: MessageRole::User,
            content: "hello".to_string(),
            model: None,
            created_at: Utc::now(),
            author_user_id: None,
        };
        assert!(root.is_root());

        let child = Message {
            id: Uuid::now_v7(),
            parent_id: Some(root.id),
            role: MessageRole::Assistant,
            model: Some("claude-sonnet-4-20250514".to_string()),
            ..root.clone()
        };
        assert!(!child.is_root());
    }
}
