//! SQLite collaboration session repository implementation.
//!
//! Implements `SessionRepository` from `tangle-core`. The Active -> Ended
//! transition is a single conditional UPDATE scoped by session id, chat id,
//! and current status -- that is what makes `end_session` linearizable with
//! respect to concurrent joins without any in-process locking. Participant
//! joins are an `INSERT OR IGNORE ... WHERE EXISTS` conditioned on the
//! session still being active, so the losing side of a join/end race never
//! lands in an ended session's participant set.

use chrono::{DateTime, Utc};
use sqlx::Row;
use tangle_core::collab::repository::{ParticipantAdd, SessionRepository};
use tangle_types::collab::{CollaborationSession, SessionStatus};
use tangle_types::error::RepositoryError;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::row::{format_datetime, parse_datetime, parse_uuid};

/// SQLite-backed implementation of `SessionRepository`.
#[derive(Clone)]
pub struct SqliteSessionRepository {
    pool: DatabasePool,
}

impl SqliteSessionRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    async fn load_participants(&self, session_id: &str) -> Result<Vec<Uuid>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT user_id FROM session_participants WHERE session_id = ? ORDER BY joined_at ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut participants = Vec::with_capacity(rows.len());
        for row in &rows {
            let user_id: String = row
                .try_get("user_id")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            participants.push(parse_uuid(&user_id, "user_id")?);
        }
        Ok(participants)
    }

    async fn hydrate(&self, row: SessionRow) -> Result<CollaborationSession, RepositoryError> {
        let participant_ids = self.load_participants(&row.id).await?;
        row.into_session(participant_ids)
    }
}

/// Internal row type for mapping SQLite rows to domain CollaborationSession.
struct SessionRow {
    id: String,
    chat_id: String,
    owner_id: String,
    status: String,
    created_at: String,
    ended_at: Option<String>,
}

impl SessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            owner_id: row.try_get("owner_id")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            ended_at: row.try_get("ended_at")?,
        })
    }

    fn into_session(
        self,
        participant_ids: Vec<Uuid>,
    ) -> Result<CollaborationSession, RepositoryError> {
        let status: SessionStatus = self
            .status
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(CollaborationSession {
            id: parse_uuid(&self.id, "session id")?,
            chat_id: parse_uuid(&self.chat_id, "chat_id")?,
            owner_id: parse_uuid(&self.owner_id, "owner_id")?,
            status,
            participant_ids,
            created_at: parse_datetime(&self.created_at)?,
            ended_at: self.ended_at.as_deref().map(parse_datetime).transpose()?,
        })
    }
}

impl SessionRepository for SqliteSessionRepository {
    async fn create_session(&self, session: &CollaborationSession) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO collab_sessions (id, chat_id, owner_id, status, created_at, ended_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(session.id.to_string())
        .bind(session.chat_id.to_string())
        .bind(session.owner_id.to_string())
        .bind(session.status.to_string())
        .bind(format_datetime(&session.created_at))
        .bind(session.ended_at.as_ref().map(format_datetime))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| match e.as_database_error() {
            // idx_sessions_one_active: a second active session for the chat.
            Some(db) if db.is_unique_violation() => RepositoryError::Conflict(
                "chat already has an active collaboration session".to_string(),
            ),
            _ => RepositoryError::Query(e.to_string()),
        })?;

        Ok(())
    }

    async fn get_session(
        &self,
        session_id: &Uuid,
    ) -> Result<Option<CollaborationSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM collab_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let session_row =
                    SessionRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(self.hydrate(session_row).await?))
            }
            None => Ok(None),
        }
    }

    async fn get_active_for_chat(
        &self,
        chat_id: &Uuid,
    ) -> Result<Option<CollaborationSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM collab_sessions WHERE chat_id = ? AND status = 'active'")
            .bind(chat_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let session_row =
                    SessionRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(self.hydrate(session_row).await?))
            }
            None => Ok(None),
        }
    }

    async fn add_participant(
        &self,
        session_id: &Uuid,
        user_id: &Uuid,
        joined_at: DateTime<Utc>,
    ) -> Result<ParticipantAdd, RepositoryError> {
        // The status check and the insert are one statement, so an end that
        // commits between the caller's read and this write makes it a no-op.
        let result = sqlx::query(
            r#"INSERT OR IGNORE INTO session_participants (session_id, user_id, joined_at)
               SELECT ?, ?, ?
               WHERE EXISTS (SELECT 1 FROM collab_sessions WHERE id = ? AND status = 'active')"#,
        )
        .bind(session_id.to_string())
        .bind(user_id.to_string())
        .bind(format_datetime(&joined_at))
        .bind(session_id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() > 0 {
            return Ok(ParticipantAdd::Added);
        }

        // Zero rows is either an existing membership (IGNORE fired) or an
        // inactive session (EXISTS failed); disambiguate with a read.
        let existing = sqlx::query(
            "SELECT 1 FROM session_participants WHERE session_id = ? AND user_id = ?",
        )
        .bind(session_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if existing.is_some() {
            Ok(ParticipantAdd::AlreadyPresent)
        } else {
            Ok(ParticipantAdd::NotActive)
        }
    }

    async fn remove_participant(
        &self,
        session_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM session_participants WHERE session_id = ? AND user_id = ?")
                .bind(session_id.to_string())
                .bind(user_id.to_string())
                .execute(&self.pool.writer)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn end_active(
        &self,
        session_id: &Uuid,
        chat_id: &Uuid,
        ended_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"UPDATE collab_sessions
               SET status = 'ended', ended_at = ?
               WHERE id = ? AND chat_id = ? AND status = 'active'"#,
        )
        .bind(format_datetime(&ended_at))
        .bind(session_id.to_string())
        .bind(chat_id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::chat::SqliteChatRepository;
    use crate::sqlite::pool::DatabasePool;
    use tangle_core::chat::repository::ChatRepository;
    use tangle_types::chat::Chat;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    async fn make_chat(pool: &DatabasePool) -> Chat {
        let chat = Chat {
            id: Uuid::now_v7(),
            owner_id: Uuid::now_v7(),
            title: None,
            created_at: Utc::now(),
        };
        SqliteChatRepository::new(pool.clone())
            .create_chat(&chat)
            .await
            .unwrap();
        chat
    }

    fn make_session(chat: &Chat) -> CollaborationSession {
        CollaborationSession {
            id: Uuid::now_v7(),
            chat_id: chat.id,
            owner_id: chat.owner_id,
            status: SessionStatus::Active,
            participant_ids: vec![],
            created_at: Utc::now(),
            ended_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let pool = test_pool().await;
        let repo = SqliteSessionRepository::new(pool.clone());
        let chat = make_chat(&pool).await;

        let session = make_session(&chat);
        repo.create_session(&session).await.unwrap();

        let found = repo.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(found.id, session.id);
        assert_eq!(found.chat_id, chat.id);
        assert!(found.is_active());
        assert!(found.participant_ids.is_empty());
    }

    #[tokio::test]
    async fn test_second_active_session_hits_unique_index() {
        let pool = test_pool().await;
        let repo = SqliteSessionRepository::new(pool.clone());
        let chat = make_chat(&pool).await;

        repo.create_session(&make_session(&chat)).await.unwrap();
        let err = repo.create_session(&make_session(&chat)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_add_participant_is_idempotent() {
        let pool = test_pool().await;
        let repo = SqliteSessionRepository::new(pool.clone());
        let chat = make_chat(&pool).await;

        let session = make_session(&chat);
        repo.create_session(&session).await.unwrap();

        let user = Uuid::now_v7();
        assert_eq!(
            repo.add_participant(&session.id, &user, Utc::now()).await.unwrap(),
            ParticipantAdd::Added
        );
        assert_eq!(
            repo.add_participant(&session.id, &user, Utc::now()).await.unwrap(),
            ParticipantAdd::AlreadyPresent
        );

        let found = repo.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(found.participant_ids, vec![user]);
    }

    #[tokio::test]
    async fn test_add_participant_after_end_is_rejected() {
        let pool = test_pool().await;
        let repo = SqliteSessionRepository::new(pool.clone());
        let chat = make_chat(&pool).await;

        let session = make_session(&chat);
        repo.create_session(&session).await.unwrap();

        let early = Uuid::now_v7();
        repo.add_participant(&session.id, &early, Utc::now()).await.unwrap();
        assert!(repo.end_active(&session.id, &chat.id, Utc::now()).await.unwrap());

        // A join whose pre-check read the session as active but whose insert
        // ran after the end: the conditional insert records nothing.
        let late = Uuid::now_v7();
        assert_eq!(
            repo.add_participant(&session.id, &late, Utc::now()).await.unwrap(),
            ParticipantAdd::NotActive
        );

        let found = repo.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(found.participant_ids, vec![early]);
    }

    #[tokio::test]
    async fn test_remove_participant() {
        let pool = test_pool().await;
        let repo = SqliteSessionRepository::new(pool.clone());
        let chat = make_chat(&pool).await;

        let session = make_session(&chat);
        repo.create_session(&session).await.unwrap();

        let user = Uuid::now_v7();
        repo.add_participant(&session.id, &user, Utc::now()).await.unwrap();
        assert!(repo.remove_participant(&session.id, &user).await.unwrap());
        assert!(!repo.remove_participant(&session.id, &user).await.unwrap());
    }

    #[tokio::test]
    async fn test_end_active_is_one_shot() {
        let pool = test_pool().await;
        let repo = SqliteSessionRepository::new(pool.clone());
        let chat = make_chat(&pool).await;

        let session = make_session(&chat);
        repo.create_session(&session).await.unwrap();

        assert!(repo.end_active(&session.id, &chat.id, Utc::now()).await.unwrap());
        // Second transition affects zero rows.
        assert!(!repo.end_active(&session.id, &chat.id, Utc::now()).await.unwrap());

        let found = repo.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(found.status, SessionStatus::Ended);
        assert!(found.ended_at.is_some());
    }

    #[tokio::test]
    async fn test_end_active_scoped_by_chat() {
        let pool = test_pool().await;
        let repo = SqliteSessionRepository::new(pool.clone());
        let chat = make_chat(&pool).await;
        let other_chat = make_chat(&pool).await;

        let session = make_session(&chat);
        repo.create_session(&session).await.unwrap();

        // Mismatched chat: zero rows, session stays active.
        assert!(!repo.end_active(&session.id, &other_chat.id, Utc::now()).await.unwrap());
        let found = repo.get_session(&session.id).await.unwrap().unwrap();
        assert!(found.is_active());
    }

    #[tokio::test]
    async fn test_ended_session_frees_the_active_slot() {
        let pool = test_pool().await;
        let repo = SqliteSessionRepository::new(pool.clone());
        let chat = make_chat(&pool).await;

        let first = make_session(&chat);
        repo.create_session(&first).await.unwrap();
        repo.end_active(&first.id, &chat.id, Utc::now()).await.unwrap();

        // The partial unique index only covers active rows.
        let second = make_session(&chat);
        repo.create_session(&second).await.unwrap();

        let active = repo.get_active_for_chat(&chat.id).await.unwrap().unwrap();
        assert_eq!(active.id, second.id);
    }
}
