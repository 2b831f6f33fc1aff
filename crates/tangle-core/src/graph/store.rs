//! Graph store enforcing the message-graph invariants.
//!
//! Owns the rules the rest of the system relies on: exactly one root per
//! chat, acyclic ancestry, and unrestricted sibling branching. Branching is
//! conflict-free by construction -- two concurrent `branch_from` calls on
//! the same parent both succeed and simply become siblings, which is how
//! "mind" mode fans one prompt out to several models without locking.
//!
//! Every mutation consults the [`AccessGuard`] first and publishes exactly
//! one `MessageCreated` event on success.

use chrono::Utc;
use tangle_types::error::{ChatError, RepositoryError};
use tangle_types::event::ChatEvent;
use tangle_types::message::{Message, MessageRole};
use tracing::info;
use uuid::Uuid;

use std::collections::HashSet;

use crate::access::guard::AccessGuard;
use crate::chat::repository::ChatRepository;
use crate::collab::repository::SessionRepository;
use crate::event::bus::EventBus;
use crate::graph::repository::MessageRepository;

/// Invariant-enforcing service over the message graph.
///
/// Generic over the repository traits so tangle-core never depends on
/// tangle-infra.
pub struct GraphStore<M: MessageRepository, C: ChatRepository, S: SessionRepository> {
    message_repo: M,
    guard: AccessGuard<C, S>,
    bus: EventBus,
}

impl<M: MessageRepository, C: ChatRepository, S: SessionRepository> GraphStore<M, C, S> {
    pub fn new(message_repo: M, guard: AccessGuard<C, S>, bus: EventBus) -> Self {
        Self {
            message_repo,
            guard,
            bus,
        }
    }

    /// Create the chat's root message.
    ///
    /// Fails with `InvalidState` if the chat already has a root. The logic
    /// check is backed by the storage layer's partial unique index, so a
    /// concurrent duplicate root loses there too.
    pub async fn create_root_message(
        &self,
        chat_id: &Uuid,
        requester_id: &Uuid,
        content: String,
        role: MessageRole,
        model: Option<String>,
    ) -> Result<Message, ChatError> {
        let chat = self.guard.require_write(chat_id, requester_id).await?;

        if self.message_repo.get_root(chat_id).await?.is_some() {
            return Err(ChatError::InvalidState(
                "chat already has a root message".to_string(),
            ));
        }

        let message = build_message(*chat_id, None, content, role, model, chat.owner_id, *requester_id);
        self.insert_and_publish(message).await
    }

    /// Create a sibling branch under an existing message.
    ///
    /// Fails with `NotFound` if `parent_id` does not resolve. Always succeeds
    /// in creating a sibling even if the parent already has children --
    /// branching is unrestricted.
    pub async fn branch_from(
        &self,
        parent_id: &Uuid,
        requester_id: &Uuid,
        content: String,
        role: MessageRole,
        model: Option<String>,
    ) -> Result<Message, ChatError> {
        let parent = self
            .message_repo
            .get_message(parent_id)
            .await?
            .ok_or(ChatError::NotFound("parent message"))?;

        let chat = self.guard.require_write(&parent.chat_id, requester_id).await?;

        let message = build_message(
            parent.chat_id,
            Some(parent.id),
            content,
            role,
            model,
            chat.owner_id,
            *requester_id,
        );
        // parent_id is only ever set to a pre-existing id, so cycles cannot
        // arise; still reject a self-referential node outright.
        if message.parent_id == Some(message.id) {
            return Err(ChatError::InvalidState(
                "message cannot be its own parent".to_string(),
            ));
        }
        self.insert_and_publish(message).await
    }

    /// The root-to-leaf sequence of messages ending at `message_id`.
    ///
    /// Projects the graph into the linear "chat" view. The walk is bounded by
    /// a visited set: malformed data (a cycle or a dangling parent) surfaces
    /// as `InvalidState` instead of looping.
    pub async fn ancestry_path(
        &self,
        message_id: &Uuid,
        requester_id: &Uuid,
    ) -> Result<Vec<Message>, ChatError> {
        let message = self
            .message_repo
            .get_message(message_id)
            .await?
            .ok_or(ChatError::NotFound("message"))?;
        self.guard.require_write(&message.chat_id, requester_id).await?;
        self.walk_to_root(message).await
    }

    /// Direct children of a message, oldest first.
    ///
    /// A result with more than one entry is a branch point, rendered as
    /// divergent continuations in "mind" mode.
    pub async fn list_children(
        &self,
        message_id: &Uuid,
        requester_id: &Uuid,
    ) -> Result<Vec<Message>, ChatError> {
        let message = self
            .message_repo
            .get_message(message_id)
            .await?
            .ok_or(ChatError::NotFound("message"))?;
        self.guard.require_write(&message.chat_id, requester_id).await?;
        Ok(self.message_repo.list_children(message_id).await?)
    }

    /// The default linear projection: ancestry path of the most recently
    /// created leaf. Empty for a chat with no messages.
    pub async fn linear_view(
        &self,
        chat_id: &Uuid,
        requester_id: &Uuid,
    ) -> Result<Vec<Message>, ChatError> {
        self.guard.require_write(chat_id, requester_id).await?;
        match self.message_repo.latest_leaf(chat_id).await? {
            Some(leaf) => self.walk_to_root(leaf).await,
            None => Ok(Vec::new()),
        }
    }

    async fn walk_to_root(&self, leaf: Message) -> Result<Vec<Message>, ChatError> {
        let mut visited: HashSet<Uuid> = HashSet::from([leaf.id]);
        let mut path = vec![leaf];

        while let Some(parent_id) = path.last().and_then(|m| m.parent_id) {
            if !visited.insert(parent_id) {
                return Err(ChatError::InvalidState(
                    "cycle detected in message ancestry".to_string(),
                ));
            }
            let parent = self
                .message_repo
                .get_message(&parent_id)
                .await?
                .ok_or_else(|| {
                    ChatError::InvalidState("dangling parent in message ancestry".to_string())
                })?;
            path.push(parent);
        }

        path.reverse();
        Ok(path)
    }

    async fn insert_and_publish(&self, message: Message) -> Result<Message, ChatError> {
        self.message_repo
            .insert_message(&message)
            .await
            .map_err(|e| match e {
                // The partial unique root index fired under a concurrent
                // duplicate-root race.
                RepositoryError::Conflict(msg) => ChatError::InvalidState(msg),
                other => other.into(),
            })?;

        info!(
            message_id = %message.id,
            chat_id = %message.chat_id,
            role = %message.role,
            "Message created"
        );
        self.bus.publish(ChatEvent::MessageCreated {
            chat_id: message.chat_id,
            message: message.clone(),
        });
        Ok(message)
    }
}

/// Assemble a message node. `model` is meaningful only for assistant
/// messages and is dropped otherwise; `author_user_id` is recorded only for
/// collaborator writes.
fn build_message(
    chat_id: Uuid,
    parent_id: Option<Uuid>,
    content: String,
    role: MessageRole,
    model: Option<String>,
    chat_owner_id: Uuid,
    requester_id: Uuid,
) -> Message {
    Message {
        id: Uuid::now_v7(),
        chat_id,
        parent_id,
        role,
        content,
        model: match role {
            MessageRole::Assistant => model,
            MessageRole::User => None,
        },
        created_at: Utc::now(),
        author_user_id: (requester_id != chat_owner_id).then_some(requester_id),
    }
}
