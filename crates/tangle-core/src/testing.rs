//! In-memory repository implementations backing the unit tests.
//!
//! These mirror the SQLite repositories' observable behavior, including the
//! single-root conflict on insert and the conditional Active -> Ended
//! transition, so service tests exercise the same contract the real
//! implementations provide.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tangle_types::chat::{Chat, ChatSummary};
use tangle_types::collab::{CollaborationSession, SessionStatus};
use tangle_types::error::RepositoryError;
use tangle_types::message::Message;
use uuid::Uuid;

use crate::chat::repository::ChatRepository;
use crate::collab::repository::{ParticipantAdd, SessionRepository};
use crate::graph::repository::MessageRepository;

#[derive(Default, Clone)]
pub(crate) struct InMemoryChatRepo {
    chats: Arc<Mutex<HashMap<Uuid, Chat>>>,
}

impl ChatRepository for InMemoryChatRepo {
    async fn create_chat(&self, chat: &Chat) -> Result<(), RepositoryError> {
        self.chats.lock().unwrap().insert(chat.id, chat.clone());
        Ok(())
    }

    async fn get_chat(&self, chat_id: &Uuid) -> Result<Option<Chat>, RepositoryError> {
        Ok(self.chats.lock().unwrap().get(chat_id).cloned())
    }

    async fn update_title(&self, chat_id: &Uuid, title: &str) -> Result<(), RepositoryError> {
        let mut chats = self.chats.lock().unwrap();
        let chat = chats.get_mut(chat_id).ok_or(RepositoryError::NotFound)?;
        chat.title = Some(title.to_string());
        Ok(())
    }

    async fn list_chats_for_owner(
        &self,
        owner_id: &Uuid,
    ) -> Result<Vec<ChatSummary>, RepositoryError> {
        let mut summaries: Vec<ChatSummary> = self
            .chats
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.owner_id == *owner_id)
            .map(ChatSummary::from)
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryMessageRepo {
    messages: Arc<Mutex<HashMap<Uuid, Message>>>,
}

impl MessageRepository for InMemoryMessageRepo {
    async fn insert_message(&self, message: &Message) -> Result<(), RepositoryError> {
        let mut messages = self.messages.lock().unwrap();
        if message.parent_id.is_none()
            && messages
                .values()
                .any(|m| m.chat_id == message.chat_id && m.parent_id.is_none())
        {
            return Err(RepositoryError::Conflict(
                "chat already has a root message".to_string(),
            ));
        }
        messages.insert(message.id, message.clone());
        Ok(())
    }

    async fn get_message(&self, message_id: &Uuid) -> Result<Option<Message>, RepositoryError> {
        Ok(self.messages.lock().unwrap().get(message_id).cloned())
    }

    async fn get_root(&self, chat_id: &Uuid) -> Result<Option<Message>, RepositoryError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .values()
            .find(|m| m.chat_id == *chat_id && m.parent_id.is_none())
            .cloned())
    }

    async fn list_children(&self, message_id: &Uuid) -> Result<Vec<Message>, RepositoryError> {
        let mut children: Vec<Message> = self
            .messages
            .lock()
            .unwrap()
            .values()
            .filter(|m| m.parent_id == Some(*message_id))
            .cloned()
            .collect();
        children.sort_by_key(|m| (m.created_at, m.id));
        Ok(children)
    }

    async fn latest_leaf(&self, chat_id: &Uuid) -> Result<Option<Message>, RepositoryError> {
        let messages = self.messages.lock().unwrap();
        let leaf = messages
            .values()
            .filter(|m| m.chat_id == *chat_id)
            .filter(|m| !messages.values().any(|c| c.parent_id == Some(m.id)))
            .max_by_key(|m| (m.created_at, m.id))
            .cloned();
        Ok(leaf)
    }
}

impl InMemoryMessageRepo {
    /// Test hook: bypass insert validation to construct malformed graphs.
    pub(crate) fn insert_raw(&self, message: Message) {
        self.messages.lock().unwrap().insert(message.id, message);
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySessionRepo {
    sessions: Arc<Mutex<HashMap<Uuid, CollaborationSession>>>,
    participants: Arc<Mutex<HashMap<Uuid, Vec<Uuid>>>>,
}

impl InMemorySessionRepo {
    fn with_participants(&self, mut session: CollaborationSession) -> CollaborationSession {
        session.participant_ids = self
            .participants
            .lock()
            .unwrap()
            .get(&session.id)
            .cloned()
            .unwrap_or_default();
        session
    }
}

impl SessionRepository for InMemorySessionRepo {
    async fn create_session(&self, session: &CollaborationSession) -> Result<(), RepositoryError> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn get_session(
        &self,
        session_id: &Uuid,
    ) -> Result<Option<CollaborationSession>, RepositoryError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .map(|s| self.with_participants(s)))
    }

    async fn get_active_for_chat(
        &self,
        chat_id: &Uuid,
    ) -> Result<Option<CollaborationSession>, RepositoryError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .values()
            .find(|s| s.chat_id == *chat_id && s.status == SessionStatus::Active)
            .cloned()
            .map(|s| self.with_participants(s)))
    }

    async fn add_participant(
        &self,
        session_id: &Uuid,
        user_id: &Uuid,
        _joined_at: DateTime<Utc>,
    ) -> Result<ParticipantAdd, RepositoryError> {
        // Mirrors the conditional insert: membership reported first, then the
        // status gate, and nothing recorded against a non-active session.
        let sessions = self.sessions.lock().unwrap();
        let Some(session) = sessions.get(session_id) else {
            return Err(RepositoryError::NotFound);
        };
        let mut participants = self.participants.lock().unwrap();
        let set = participants.entry(*session_id).or_default();
        if set.contains(user_id) {
            return Ok(ParticipantAdd::AlreadyPresent);
        }
        if session.status != SessionStatus::Active {
            return Ok(ParticipantAdd::NotActive);
        }
        set.push(*user_id);
        Ok(ParticipantAdd::Added)
    }

    async fn remove_participant(
        &self,
        session_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<bool, RepositoryError> {
        let mut participants = self.participants.lock().unwrap();
        let Some(set) = participants.get_mut(session_id) else {
            return Ok(false);
        };
        let before = set.len();
        set.retain(|u| u != user_id);
        Ok(set.len() != before)
    }

    async fn end_active(
        &self,
        session_id: &Uuid,
        chat_id: &Uuid,
        ended_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get_mut(session_id) {
            Some(s) if s.chat_id == *chat_id && s.status == SessionStatus::Active => {
                s.status = SessionStatus::Ended;
                s.ended_at = Some(ended_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

pub(crate) mod fixtures {
    use super::*;
    use tangle_types::message::MessageRole;

    pub(crate) fn chat(owner_id: Uuid) -> Chat {
        Chat {
            id: Uuid::now_v7(),
            owner_id,
            title: None,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn active_session(chat_id: Uuid, owner_id: Uuid) -> CollaborationSession {
        CollaborationSession {
            id: Uuid::now_v7(),
            chat_id,
            owner_id,
            status: SessionStatus::Active,
            participant_ids: vec![],
            created_at: Utc::now(),
            ended_at: None,
        }
    }

    pub(crate) fn root_message(chat_id: Uuid) -> Message {
        Message {
            id: Uuid::now_v7(),
            chat_id,
            parent_id: None,
            role: MessageRole::User,
            content: "hello".to_string(),
            model: None,
            created_at: Utc::now(),
            author_user_id: None,
        }
    }
}
