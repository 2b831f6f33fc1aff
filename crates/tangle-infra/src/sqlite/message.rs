//! SQLite message graph repository implementation.
//!
//! Implements `MessageRepository` from `tangle-core`. The schema's partial
//! unique index (`idx_messages_single_root`) backs the single-root invariant
//! under concurrent inserts; the unique-violation error is surfaced as
//! `RepositoryError::Conflict` so the store can report `InvalidState`.

use sqlx::Row;
use tangle_core::graph::repository::MessageRepository;
use tangle_types::error::RepositoryError;
use tangle_types::message::{Message, MessageRole};
use uuid::Uuid;

use super::pool::DatabasePool;
use super::row::{format_datetime, parse_datetime, parse_uuid};

/// SQLite-backed implementation of `MessageRepository`.
#[derive(Clone)]
pub struct SqliteMessageRepository {
    pool: DatabasePool,
}

impl SqliteMessageRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Message.
struct MessageRow {
    id: String,
    chat_id: String,
    parent_id: Option<String>,
    role: String,
    content: String,
    model: Option<String>,
    created_at: String,
    author_user_id: Option<String>,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            parent_id: row.try_get("parent_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            model: row.try_get("model")?,
            created_at: row.try_get("created_at")?,
            author_user_id: row.try_get("author_user_id")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(Message {
            id: parse_uuid(&self.id, "message id")?,
            chat_id: parse_uuid(&self.chat_id, "chat_id")?,
            parent_id: self
                .parent_id
                .as_deref()
                .map(|s| parse_uuid(s, "parent_id"))
                .transpose()?,
            role,
            content: self.content,
            model: self.model,
            created_at: parse_datetime(&self.created_at)?,
            author_user_id: self
                .author_user_id
                .as_deref()
                .map(|s| parse_uuid(s, "author_user_id"))
                .transpose()?,
        })
    }
}

fn map_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Message>, RepositoryError> {
    let mut messages = Vec::with_capacity(rows.len());
    for row in rows {
        let msg_row =
            MessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        messages.push(msg_row.into_message()?);
    }
    Ok(messages)
}

impl MessageRepository for SqliteMessageRepository {
    async fn insert_message(&self, message: &Message) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO messages (id, chat_id, parent_id, role, content, model, created_at, author_user_id)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(message.chat_id.to_string())
        .bind(message.parent_id.map(|p| p.to_string()))
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(&message.model)
        .bind(format_datetime(&message.created_at))
        .bind(message.author_user_id.map(|a| a.to_string()))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => {
                RepositoryError::Conflict("chat already has a root message".to_string())
            }
            _ => RepositoryError::Query(e.to_string()),
        })?;

        Ok(())
    }

    async fn get_message(&self, message_id: &Uuid) -> Result<Option<Message>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM messages WHERE id = ?")
            .bind(message_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let msg_row = MessageRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(msg_row.into_message()?))
            }
            None => Ok(None),
        }
    }

    async fn get_root(&self, chat_id: &Uuid) -> Result<Option<Message>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM messages WHERE chat_id = ? AND parent_id IS NULL")
            .bind(chat_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let msg_row = MessageRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(msg_row.into_message()?))
            }
            None => Ok(None),
        }
    }

    async fn list_children(&self, message_id: &Uuid) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM messages WHERE parent_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(message_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        map_rows(&rows)
    }

    async fn latest_leaf(&self, chat_id: &Uuid) -> Result<Option<Message>, RepositoryError> {
        let row = sqlx::query(
            r#"SELECT * FROM messages m
               WHERE m.chat_id = ?
                 AND NOT EXISTS (SELECT 1 FROM messages c WHERE c.parent_id = m.id)
               ORDER BY m.created_at DESC, m.id DESC
               LIMIT 1"#,
        )
        .bind(chat_id.to_string())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let msg_row = MessageRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(msg_row.into_message()?))
            }
            None => Ok(None),
        }
    }
}
