//! ChatRepository trait definition.
//!
//! Point lookups and inserts on the chat container records. Implementations
//! live in tangle-infra (e.g. `SqliteChatRepository`). Uses native async fn
//! in traits (RPITIT).

use tangle_types::chat::{Chat, ChatSummary};
use tangle_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for chat persistence.
pub trait ChatRepository: Send + Sync {
    /// Insert a new chat.
    fn create_chat(
        &self,
        chat: &Chat,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a chat by its unique ID.
    fn get_chat(
        &self,
        chat_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Chat>, RepositoryError>> + Send;

    /// Replace the chat's title.
    ///
    /// Returns `RepositoryError::NotFound` if the chat does not exist.
    fn update_title(
        &self,
        chat_id: &Uuid,
        title: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// List a user's chats, newest first, with per-chat message counts.
    fn list_chats_for_owner(
        &self,
        owner_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ChatSummary>, RepositoryError>> + Send;
}
