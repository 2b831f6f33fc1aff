//! Collaboration session lifecycle manager.
//!
//! State machine per chat: `NoSession -> Active -> Ended`, with `Ended`
//! terminal. Starting over means a new session record; an ended session is
//! never resurrected. Coordination between concurrent clients is entirely
//! storage-mediated: the only linearizable step is the conditional
//! Active -> Ended update in the repository.

use chrono::Utc;
use tangle_types::collab::{CollaborationSession, SessionStatus};
use tangle_types::error::ChatError;
use tangle_types::event::ChatEvent;
use tracing::info;
use uuid::Uuid;

use crate::access::guard::AccessGuard;
use crate::chat::repository::ChatRepository;
use crate::collab::repository::{ParticipantAdd, SessionRepository};
use crate::event::bus::EventBus;

/// Owner-gated lifecycle operations on collaboration sessions.
pub struct SessionManager<S: SessionRepository, C: ChatRepository> {
    session_repo: S,
    guard: AccessGuard<C, S>,
    bus: EventBus,
}

impl<S: SessionRepository, C: ChatRepository> SessionManager<S, C> {
    pub fn new(session_repo: S, guard: AccessGuard<C, S>, bus: EventBus) -> Self {
        Self {
            session_repo,
            guard,
            bus,
        }
    }

    /// Open collaborative editing on a chat.
    ///
    /// Fails with `Forbidden` unless `requester_id` owns the chat, and with
    /// `Conflict` if the chat already has an active session.
    pub async fn start_session(
        &self,
        chat_id: &Uuid,
        requester_id: &Uuid,
    ) -> Result<CollaborationSession, ChatError> {
        let chat = self.guard.require_owner(chat_id, requester_id).await?;

        if self.session_repo.get_active_for_chat(chat_id).await?.is_some() {
            return Err(ChatError::Conflict(
                "chat already has an active collaboration session".to_string(),
            ));
        }

        let session = CollaborationSession {
            id: Uuid::now_v7(),
            chat_id: *chat_id,
            // Always the chat owner by invariant; recorded denormalized.
            owner_id: chat.owner_id,
            status: SessionStatus::Active,
            participant_ids: Vec::new(),
            created_at: Utc::now(),
            ended_at: None,
        };
        self.session_repo.create_session(&session).await?;

        info!(session_id = %session.id, chat_id = %chat_id, "Collaboration session started");
        self.bus.publish(ChatEvent::SessionStarted {
            session_id: session.id,
            chat_id: *chat_id,
            owner_id: chat.owner_id,
        });
        Ok(session)
    }

    /// Join an active session. Idempotent: joining twice is a no-op.
    ///
    /// Fails with `NotFound` if the session does not exist or is no longer
    /// active. The insert itself is conditioned on the active status, so a
    /// join racing a concurrent end loses cleanly: `NotFound`, no membership
    /// recorded, no event after the session's `SessionEnded`.
    pub async fn join_session(
        &self,
        session_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<CollaborationSession, ChatError> {
        let session = self.active_session(session_id).await?;

        match self
            .session_repo
            .add_participant(session_id, user_id, Utc::now())
            .await?
        {
            ParticipantAdd::Added => {
                info!(session_id = %session_id, user_id = %user_id, "Participant joined");
                self.bus.publish(ChatEvent::ParticipantJoined {
                    session_id: *session_id,
                    chat_id: session.chat_id,
                    user_id: *user_id,
                });
            }
            ParticipantAdd::AlreadyPresent => {}
            // Ended between the read above and the insert.
            ParticipantAdd::NotActive => return Err(ChatError::NotFound("session")),
        }

        self.session_repo
            .get_session(session_id)
            .await?
            .ok_or(ChatError::NotFound("session"))
    }

    /// Leave a session. Idempotent: leaving a session never joined is a no-op.
    pub async fn leave_session(
        &self,
        session_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<(), ChatError> {
        let session = self.active_session(session_id).await?;

        let removed = self
            .session_repo
            .remove_participant(session_id, user_id)
            .await?;
        if removed {
            info!(session_id = %session_id, user_id = %user_id, "Participant left");
            self.bus.publish(ChatEvent::ParticipantLeft {
                session_id: *session_id,
                chat_id: session.chat_id,
                user_id: *user_id,
            });
        }
        Ok(())
    }

    /// End a session. Chat-owner only; one-way and terminal.
    ///
    /// Ownership is verified against the chat (via the guard), independent of
    /// the session's recorded `owner_id` -- the two agree by invariant. The
    /// transition itself is a conditional update scoped by session id, chat
    /// id, and current status, so a mismatched chat id, a missing session,
    /// and an already-ended session all surface as `NotFound`: ending twice
    /// is an error, not silently accepted, so client/server desynchronization
    /// stays visible.
    pub async fn end_session(
        &self,
        session_id: &Uuid,
        chat_id: &Uuid,
        requester_id: &Uuid,
    ) -> Result<(), ChatError> {
        self.guard.require_owner(chat_id, requester_id).await?;

        let ended_at = Utc::now();
        let transitioned = self
            .session_repo
            .end_active(session_id, chat_id, ended_at)
            .await?;
        if !transitioned {
            return Err(ChatError::NotFound("session"));
        }

        info!(session_id = %session_id, chat_id = %chat_id, "Collaboration session ended");
        self.bus.publish(ChatEvent::SessionEnded {
            session_id: *session_id,
            chat_id: *chat_id,
            ended_at,
        });
        Ok(())
    }

    /// Fetch a session, active or ended.
    ///
    /// Visible to the chat owner and to anyone recorded as a participant,
    /// including after the session ends.
    pub async fn get_session(
        &self,
        session_id: &Uuid,
        requester_id: &Uuid,
    ) -> Result<CollaborationSession, ChatError> {
        let session = self
            .session_repo
            .get_session(session_id)
            .await?
            .ok_or(ChatError::NotFound("session"))?;

        if session.owner_id != *requester_id && !session.participant_ids.contains(requester_id) {
            return Err(ChatError::Forbidden(
                "not a participant of this session".to_string(),
            ));
        }
        Ok(session)
    }

    /// The chat's active session, `NotFound` when collaboration is off.
    pub async fn active_session_for_chat(
        &self,
        chat_id: &Uuid,
        requester_id: &Uuid,
    ) -> Result<CollaborationSession, ChatError> {
        self.guard.require_write(chat_id, requester_id).await?;
        self.session_repo
            .get_active_for_chat(chat_id)
            .await?
            .ok_or(ChatError::NotFound("session"))
    }

    async fn active_session(
        &self,
        session_id: &Uuid,
    ) -> Result<CollaborationSession, ChatError> {
        let session = self
            .session_repo
            .get_session(session_id)
            .await?
            .ok_or(ChatError::NotFound("session"))?;
        if !session.is_active() {
            return Err(ChatError::NotFound("session"));
        }
        Ok(session)
    }
}
