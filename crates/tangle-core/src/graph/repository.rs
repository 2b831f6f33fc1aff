//! MessageRepository trait definition.
//!
//! Persistence surface for the message graph. Each mutation is a single
//! atomic write; the storage-mediated concurrency model in
//! [`crate::graph::store`] relies on that.

use tangle_types::error::RepositoryError;
use tangle_types::message::Message;
use uuid::Uuid;

/// Repository trait for message graph nodes.
///
/// Implementations live in tangle-infra (e.g. `SqliteMessageRepository`).
pub trait MessageRepository: Send + Sync {
    /// Insert a message node.
    ///
    /// Implementations must return `RepositoryError::Conflict` when the
    /// insert would create a second root for the chat (the schema's partial
    /// unique index backs the store's logic check under concurrency).
    fn insert_message(
        &self,
        message: &Message,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a message by its unique ID.
    fn get_message(
        &self,
        message_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Message>, RepositoryError>> + Send;

    /// Get the chat's root message (`parent_id IS NULL`), if any.
    fn get_root(
        &self,
        chat_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Message>, RepositoryError>> + Send;

    /// List direct children of a message, oldest first.
    fn list_children(
        &self,
        message_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// The most recently created leaf (childless message) in a chat.
    ///
    /// Used to pick the default path for the linear "chat" projection.
    fn latest_leaf(
        &self,
        chat_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Message>, RepositoryError>> + Send;
}
