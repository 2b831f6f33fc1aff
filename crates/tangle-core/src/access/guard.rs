//! Authorization guard consulted by every mutating path.
//!
//! Pure predicates over persisted state: no mutable state of its own, and
//! deliberately re-derived on every call rather than cached, since
//! collaboration session membership changes mid-conversation. Failing a
//! check always yields `Forbidden` before any write happens.

use tangle_types::chat::Chat;
use tangle_types::error::ChatError;
use uuid::Uuid;

use crate::chat::repository::ChatRepository;
use crate::collab::repository::SessionRepository;

/// Ownership and write-access checks shared by the graph store, the session
/// manager, and chat-retrieval paths.
pub struct AccessGuard<C: ChatRepository, S: SessionRepository> {
    chat_repo: C,
    session_repo: S,
}

impl<C: ChatRepository, S: SessionRepository> AccessGuard<C, S> {
    pub fn new(chat_repo: C, session_repo: S) -> Self {
        Self {
            chat_repo,
            session_repo,
        }
    }

    /// Whether `user_id` owns the chat.
    ///
    /// A missing chat is reported as `false`, not an error; callers that need
    /// to distinguish use [`Self::require_owner`].
    pub async fn is_chat_owner(&self, chat_id: &Uuid, user_id: &Uuid) -> Result<bool, ChatError> {
        let chat = self.chat_repo.get_chat(chat_id).await?;
        Ok(chat.is_some_and(|c| c.owner_id == *user_id))
    }

    /// Whether `user_id` may write to the chat's graph: the owner, or a
    /// participant of a currently active collaboration session.
    pub async fn can_write_to_chat(
        &self,
        chat_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<bool, ChatError> {
        let Some(chat) = self.chat_repo.get_chat(chat_id).await? else {
            return Ok(false);
        };
        if chat.owner_id == *user_id {
            return Ok(true);
        }
        let session = self.session_repo.get_active_for_chat(chat_id).await?;
        Ok(session.is_some_and(|s| s.participant_ids.contains(user_id)))
    }

    /// Resolve the chat and require that `user_id` owns it.
    ///
    /// `NotFound` when the chat does not exist, `Forbidden` otherwise.
    pub async fn require_owner(&self, chat_id: &Uuid, user_id: &Uuid) -> Result<Chat, ChatError> {
        let chat = self
            .chat_repo
            .get_chat(chat_id)
            .await?
            .ok_or(ChatError::NotFound("chat"))?;
        if chat.owner_id != *user_id {
            return Err(ChatError::Forbidden(
                "only the chat owner may perform this operation".to_string(),
            ));
        }
        Ok(chat)
    }

    /// Resolve the chat and require write access for `user_id`.
    ///
    /// `NotFound` when the chat does not exist, `Forbidden` when the user is
    /// neither the owner nor an active-session participant.
    pub async fn require_write(&self, chat_id: &Uuid, user_id: &Uuid) -> Result<Chat, ChatError> {
        let chat = self
            .chat_repo
            .get_chat(chat_id)
            .await?
            .ok_or(ChatError::NotFound("chat"))?;
        if chat.owner_id == *user_id {
            return Ok(chat);
        }
        let session = self.session_repo.get_active_for_chat(chat_id).await?;
        if session.is_some_and(|s| s.participant_ids.contains(user_id)) {
            return Ok(chat);
        }
        Err(ChatError::Forbidden(
            "no write access to this chat".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, InMemoryChatRepo, InMemorySessionRepo};

    fn guard(
        chats: &InMemoryChatRepo,
        sessions: &InMemorySessionRepo,
    ) -> AccessGuard<InMemoryChatRepo, InMemorySessionRepo> {
        AccessGuard::new(chats.clone(), sessions.clone())
    }

    #[tokio::test]
    async fn owner_can_write_without_a_session() {
        let chats = InMemoryChatRepo::default();
        let sessions = InMemorySessionRepo::default();
        let owner = Uuid::now_v7();
        let chat = fixtures::chat(owner);
        chats.create_chat(&chat).await.unwrap();

        let guard = guard(&chats, &sessions);
        assert!(guard.is_chat_owner(&chat.id, &owner).await.unwrap());
        assert!(guard.can_write_to_chat(&chat.id, &owner).await.unwrap());
    }

    #[tokio::test]
    async fn stranger_cannot_write() {
        let chats = InMemoryChatRepo::default();
        let sessions = InMemorySessionRepo::default();
        let chat = fixtures::chat(Uuid::now_v7());
        chats.create_chat(&chat).await.unwrap();

        let guard = guard(&chats, &sessions);
        let stranger = Uuid::now_v7();
        assert!(!guard.can_write_to_chat(&chat.id, &stranger).await.unwrap());
        let err = guard.require_write(&chat.id, &stranger).await.unwrap_err();
        assert!(matches!(err, ChatError::Forbidden(_)));
    }

    #[tokio::test]
    async fn active_session_participant_can_write() {
        let chats = InMemoryChatRepo::default();
        let sessions = InMemorySessionRepo::default();
        let owner = Uuid::now_v7();
        let collaborator = Uuid::now_v7();
        let chat = fixtures::chat(owner);
        chats.create_chat(&chat).await.unwrap();

        let session = fixtures::active_session(chat.id, owner);
        sessions.create_session(&session).await.unwrap();
        sessions
            .add_participant(&session.id, &collaborator, chrono::Utc::now())
            .await
            .unwrap();

        let guard = guard(&chats, &sessions);
        assert!(guard.can_write_to_chat(&chat.id, &collaborator).await.unwrap());
        // Participant of an active session is still not the owner.
        assert!(!guard.is_chat_owner(&chat.id, &collaborator).await.unwrap());
    }

    #[tokio::test]
    async fn ended_session_revokes_participant_access() {
        let chats = InMemoryChatRepo::default();
        let sessions = InMemorySessionRepo::default();
        let owner = Uuid::now_v7();
        let collaborator = Uuid::now_v7();
        let chat = fixtures::chat(owner);
        chats.create_chat(&chat).await.unwrap();

        let session = fixtures::active_session(chat.id, owner);
        sessions.create_session(&session).await.unwrap();
        sessions
            .add_participant(&session.id, &collaborator, chrono::Utc::now())
            .await
            .unwrap();
        sessions
            .end_active(&session.id, &chat.id, chrono::Utc::now())
            .await
            .unwrap();

        let guard = guard(&chats, &sessions);
        assert!(!guard.can_write_to_chat(&chat.id, &collaborator).await.unwrap());
    }

    #[tokio::test]
    async fn missing_chat_is_not_found_for_require_variants() {
        let chats = InMemoryChatRepo::default();
        let sessions = InMemorySessionRepo::default();
        let guard = guard(&chats, &sessions);
        let user = Uuid::now_v7();
        let missing = Uuid::now_v7();

        assert!(!guard.is_chat_owner(&missing, &user).await.unwrap());
        let err = guard.require_owner(&missing, &user).await.unwrap_err();
        assert!(matches!(err, ChatError::NotFound("chat")));
        let err = guard.require_write(&missing, &user).await.unwrap_err();
        assert!(matches!(err, ChatError::NotFound("chat")));
    }
}
