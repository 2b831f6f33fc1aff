//! Chat service orchestrating chat creation, listing, and titles.
//!
//! A chat comes into existence with its first user message: `create_chat`
//! writes the chat record and the graph's root node in one orchestration and
//! synthesizes the initial title from that first message. Renaming is owner
//! only; automatic title refresh never overwrites a non-default title.

use chrono::Utc;
use tangle_types::chat::{Chat, ChatSummary};
use tangle_types::error::ChatError;
use tangle_types::event::ChatEvent;
use tangle_types::message::{Message, MessageRole};
use tracing::info;
use uuid::Uuid;

use crate::access::guard::AccessGuard;
use crate::chat::repository::ChatRepository;
use crate::chat::title::{is_default_title, synthesize_title};
use crate::collab::repository::SessionRepository;
use crate::event::bus::EventBus;
use crate::graph::repository::MessageRepository;

/// Orchestrates chat lifecycle and title management.
pub struct ChatService<C: ChatRepository, M: MessageRepository, S: SessionRepository> {
    chat_repo: C,
    message_repo: M,
    guard: AccessGuard<C, S>,
    bus: EventBus,
}

impl<C: ChatRepository, M: MessageRepository, S: SessionRepository> ChatService<C, M, S> {
    pub fn new(chat_repo: C, message_repo: M, guard: AccessGuard<C, S>, bus: EventBus) -> Self {
        Self {
            chat_repo,
            message_repo,
            guard,
            bus,
        }
    }

    /// Create a chat from its first user message.
    ///
    /// Writes the chat record with a synthesized title, then the graph's
    /// root message. Returns both. The two writes are not transactional: a
    /// failure after the chat insert leaves an empty chat whose root can
    /// still be created through the graph store, and no invariant depends
    /// on a chat having messages, so the partial state is tolerated rather
    /// than rolled back.
    pub async fn create_chat(
        &self,
        owner_id: &Uuid,
        first_content: String,
    ) -> Result<(Chat, Message), ChatError> {
        let chat = Chat {
            id: Uuid::now_v7(),
            owner_id: *owner_id,
            title: Some(synthesize_title(&first_content)),
            created_at: Utc::now(),
        };
        self.chat_repo.create_chat(&chat).await?;

        let root = Message {
            id: Uuid::now_v7(),
            chat_id: chat.id,
            parent_id: None,
            role: MessageRole::User,
            content: first_content,
            model: None,
            created_at: Utc::now(),
            author_user_id: None,
        };
        self.message_repo.insert_message(&root).await?;

        info!(chat_id = %chat.id, owner_id = %owner_id, "Chat created");
        self.bus.publish(ChatEvent::MessageCreated {
            chat_id: chat.id,
            message: root.clone(),
        });
        Ok((chat, root))
    }

    /// Get a chat the requester may access (owner or active participant).
    pub async fn get_chat(&self, chat_id: &Uuid, requester_id: &Uuid) -> Result<Chat, ChatError> {
        self.guard.require_write(chat_id, requester_id).await
    }

    /// List the requester's own chats, newest first.
    pub async fn list_chats(&self, owner_id: &Uuid) -> Result<Vec<ChatSummary>, ChatError> {
        Ok(self.chat_repo.list_chats_for_owner(owner_id).await?)
    }

    /// Owner-set custom title. First non-default wins from here on.
    pub async fn rename_chat(
        &self,
        chat_id: &Uuid,
        requester_id: &Uuid,
        title: String,
    ) -> Result<(), ChatError> {
        self.guard.require_owner(chat_id, requester_id).await?;
        self.chat_repo.update_title(chat_id, &title).await?;
        info!(chat_id = %chat_id, "Chat renamed");
        Ok(())
    }

    /// Re-synthesize the title from `content` if the current title is still
    /// a placeholder. A user-customized title is never overwritten.
    pub async fn refresh_title(&self, chat_id: &Uuid, content: &str) -> Result<(), ChatError> {
        let chat = self
            .chat_repo
            .get_chat(chat_id)
            .await?
            .ok_or(ChatError::NotFound("chat"))?;

        if is_default_title(chat.title.as_deref()) {
            self.chat_repo
                .update_title(chat_id, &synthesize_title(content))
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryChatRepo, InMemoryMessageRepo, InMemorySessionRepo};

    type TestService = ChatService<InMemoryChatRepo, InMemoryMessageRepo, InMemorySessionRepo>;

    fn service() -> (TestService, InMemoryChatRepo) {
        let chats = InMemoryChatRepo::default();
        let messages = InMemoryMessageRepo::default();
        let sessions = InMemorySessionRepo::default();
        let guard = AccessGuard::new(chats.clone(), sessions);
        (
            ChatService::new(chats.clone(), messages, guard, EventBus::new(16)),
            chats,
        )
    }

    #[tokio::test]
    async fn create_chat_writes_root_and_title() {
        let (service, _) = service();
        let owner = Uuid::now_v7();

        let (chat, root) = service
            .create_chat(&owner, "Plan a trip to Japan".to_string())
            .await
            .unwrap();

        assert_eq!(chat.owner_id, owner);
        assert_eq!(chat.title.as_deref(), Some("Plan a trip to Japan"));
        assert!(root.is_root());
        assert_eq!(root.chat_id, chat.id);
        assert_eq!(root.role, MessageRole::User);
    }

    #[tokio::test]
    async fn create_chat_truncates_long_first_message() {
        let (service, _) = service();
        let owner = Uuid::now_v7();
        let long = "Can you help me understand how neural networks learn from data?";

        let (chat, _) = service.create_chat(&owner, long.to_string()).await.unwrap();
        let title = chat.title.unwrap();
        assert!(title.ends_with('\u{2026}'));
        assert!(title.chars().count() <= 41);
    }

    #[tokio::test]
    async fn list_chats_is_owner_scoped_and_newest_first() {
        let (service, _) = service();
        let owner = Uuid::now_v7();
        let other = Uuid::now_v7();

        let (first, _) = service.create_chat(&owner, "first".to_string()).await.unwrap();
        let (second, _) = service.create_chat(&owner, "second".to_string()).await.unwrap();
        service.create_chat(&other, "not mine".to_string()).await.unwrap();

        let listed = service.list_chats(&owner).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn rename_is_owner_only() {
        let (service, _) = service();
        let owner = Uuid::now_v7();
        let (chat, _) = service.create_chat(&owner, "hello".to_string()).await.unwrap();

        let err = service
            .rename_chat(&chat.id, &Uuid::now_v7(), "hijacked".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Forbidden(_)));

        service
            .rename_chat(&chat.id, &owner, "My plans".to_string())
            .await
            .unwrap();
        let renamed = service.get_chat(&chat.id, &owner).await.unwrap();
        assert_eq!(renamed.title.as_deref(), Some("My plans"));
    }

    #[tokio::test]
    async fn refresh_title_never_overwrites_custom_title() {
        let (service, chats) = service();
        let owner = Uuid::now_v7();
        let (chat, _) = service.create_chat(&owner, "hello".to_string()).await.unwrap();

        // Force a placeholder, as a chat imported without a title would have.
        chats.update_title(&chat.id, "New Chat").await.unwrap();
        service
            .refresh_title(&chat.id, "What is the capital of France?")
            .await
            .unwrap();
        let refreshed = service.get_chat(&chat.id, &owner).await.unwrap();
        assert_eq!(
            refreshed.title.as_deref(),
            Some("What is the capital of France?")
        );

        // Non-default titles are left alone.
        service.refresh_title(&chat.id, "something else").await.unwrap();
        let unchanged = service.get_chat(&chat.id, &owner).await.unwrap();
        assert_eq!(
            unchanged.title.as_deref(),
            Some("What is the capital of France?")
        );
    }
}
