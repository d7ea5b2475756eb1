//! libSQL backend — async `Database` trait implementation.
//!
//! Supports local file and in-memory databases. Schema is initialized on
//! open.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::conversation::ConversationState;
use crate::error::DatabaseError;
use crate::role::Role;
use crate::store::traits::{Database, StoredChatMessage, StoredRole};

/// libSQL database backend.
///
/// Stores a single connection reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and initialize the schema.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Connection(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Connection(format!("Failed to open libSQL database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Connection(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.init_schema().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Connection(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Connection(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.init_schema().await?;
        Ok(backend)
    }

    async fn init_schema(&self) -> Result<(), DatabaseError> {
        let statements = [
            "CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                started_at TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                role_info TEXT,
                timestamp TEXT NOT NULL
            )",
            "CREATE INDEX IF NOT EXISTS idx_messages_session
                ON messages(session_id, timestamp)",
            "CREATE TABLE IF NOT EXISTS user_data (
                user_id TEXT NOT NULL,
                role TEXT NOT NULL,
                answers TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (user_id, role)
            )",
            "CREATE TABLE IF NOT EXISTS session_state (
                session_id TEXT PRIMARY KEY,
                state TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        ];
        for sql in statements {
            self.conn.execute(sql, ()).await.map_err(query_err)?;
        }
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn query_err(e: libsql::Error) -> DatabaseError {
    DatabaseError::Query(e.to_string())
}

/// Convert `Option<&str>` to libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

/// Parse an RFC 3339 datetime string written by this backend.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn role_from_str(s: &str) -> StoredRole {
    match s {
        "Assistant" => StoredRole::Assistant,
        _ => StoredRole::User,
    }
}

fn row_to_message(row: &libsql::Row) -> Result<StoredChatMessage, libsql::Error> {
    let role_str: String = row.get(3)?;
    // role_info is nullable; a failed get means NULL
    let role_info_str: Option<String> = row.get(5).ok();
    let timestamp_str: String = row.get(6)?;

    Ok(StoredChatMessage {
        id: row.get(0)?,
        session_id: row.get(1)?,
        user_id: row.get(2)?,
        role: role_from_str(&role_str),
        content: row.get(4)?,
        role_info: role_info_str.as_deref().and_then(Role::from_name),
        timestamp: parse_datetime(&timestamp_str),
    })
}

#[async_trait]
impl Database for LibSqlBackend {
    async fn create_session(&self, user_id: &str) -> Result<String, DatabaseError> {
        let id = Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO sessions (id, user_id, started_at) VALUES (?1, ?2, ?3)",
                params![id.clone(), user_id, Utc::now().to_rfc3339()],
            )
            .await
            .map_err(query_err)?;
        debug!(session_id = %id, user_id, "Session created");
        Ok(id)
    }

    async fn append_message(
        &self,
        session_id: &str,
        user_id: &str,
        role: StoredRole,
        content: &str,
        role_info: Option<Role>,
    ) -> Result<String, DatabaseError> {
        let id = Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO messages (id, session_id, user_id, role, content, role_info, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id.clone(),
                    session_id,
                    user_id,
                    role.as_str(),
                    content,
                    opt_text(role_info.map(|r| r.name())),
                    Utc::now().to_rfc3339(),
                ],
            )
            .await
            .map_err(query_err)?;
        Ok(id)
    }

    async fn list_messages(
        &self,
        session_id: &str,
    ) -> Result<Vec<StoredChatMessage>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, session_id, user_id, role, content, role_info, timestamp
                 FROM messages WHERE session_id = ?1
                 ORDER BY timestamp ASC, rowid ASC",
                params![session_id],
            )
            .await
            .map_err(query_err)?;

        let mut messages = Vec::new();
        while let Some(row) = rows.next().await.map_err(query_err)? {
            messages.push(row_to_message(&row).map_err(query_err)?);
        }
        Ok(messages)
    }

    async fn save_role_answers(
        &self,
        user_id: &str,
        role: Role,
        answers: &[String],
    ) -> Result<(), DatabaseError> {
        let answers_json = serde_json::to_string(answers)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
        self.conn
            .execute(
                "INSERT INTO user_data (user_id, role, answers, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id, role) DO UPDATE SET
                    answers = excluded.answers,
                    updated_at = excluded.updated_at",
                params![user_id, role.name(), answers_json, Utc::now().to_rfc3339()],
            )
            .await
            .map_err(query_err)?;
        debug!(user_id, role = %role, count = answers.len(), "Role answers saved");
        Ok(())
    }

    async fn load_role_answers(
        &self,
        user_id: &str,
        role: Role,
    ) -> Result<Option<Vec<String>>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                "SELECT answers FROM user_data WHERE user_id = ?1 AND role = ?2",
                params![user_id, role.name()],
            )
            .await
            .map_err(query_err)?;

        match rows.next().await.map_err(query_err)? {
            Some(row) => {
                let raw: String = row.get(0).map_err(query_err)?;
                let answers = serde_json::from_str(&raw)
                    .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
                Ok(Some(answers))
            }
            None => Ok(None),
        }
    }

    async fn load_user_data(
        &self,
        user_id: &str,
    ) -> Result<HashMap<Role, Vec<String>>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                "SELECT role, answers FROM user_data WHERE user_id = ?1",
                params![user_id],
            )
            .await
            .map_err(query_err)?;

        let mut data = HashMap::new();
        while let Some(row) = rows.next().await.map_err(query_err)? {
            let role_str: String = row.get(0).map_err(query_err)?;
            let raw: String = row.get(1).map_err(query_err)?;
            let Some(role) = Role::from_name(&role_str) else {
                continue;
            };
            let answers: Vec<String> = serde_json::from_str(&raw)
                .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
            data.insert(role, answers);
        }
        Ok(data)
    }

    async fn load_state(
        &self,
        session_id: &str,
    ) -> Result<Option<ConversationState>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                "SELECT state FROM session_state WHERE session_id = ?1",
                params![session_id],
            )
            .await
            .map_err(query_err)?;

        match rows.next().await.map_err(query_err)? {
            Some(row) => {
                let raw: String = row.get(0).map_err(query_err)?;
                let state = serde_json::from_str(&raw)
                    .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    async fn save_state(
        &self,
        session_id: &str,
        state: &ConversationState,
    ) -> Result<(), DatabaseError> {
        let state_json = serde_json::to_string(state)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
        self.conn
            .execute(
                "INSERT INTO session_state (session_id, state, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(session_id) DO UPDATE SET
                    state = excluded.state,
                    updated_at = excluded.updated_at",
                params![session_id, state_json, Utc::now().to_rfc3339()],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }

    async fn clear_session(&self, session_id: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "DELETE FROM messages WHERE session_id = ?1",
                params![session_id],
            )
            .await
            .map_err(query_err)?;
        self.conn
            .execute(
                "DELETE FROM session_state WHERE session_id = ?1",
                params![session_id],
            )
            .await
            .map_err(query_err)?;
        debug!(session_id, "Session cleared");
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> LibSqlBackend {
        LibSqlBackend::new_memory().await.unwrap()
    }

    #[tokio::test]
    async fn create_session_returns_unique_ids() {
        let db = test_db().await;
        let a = db.create_session("u1").await.unwrap();
        let b = db.create_session("u1").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn append_and_list_preserves_order() {
        let db = test_db().await;
        let session = db.create_session("u1").await.unwrap();

        db.append_message(&session, "u1", StoredRole::User, "first", None)
            .await
            .unwrap();
        db.append_message(
            &session,
            "u1",
            StoredRole::Assistant,
            "second",
            Some(Role::ResearchAi),
        )
        .await
        .unwrap();
        db.append_message(&session, "u1", StoredRole::User, "third", None)
            .await
            .unwrap();

        let messages = db.list_messages(&session).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[1].content, "second");
        assert_eq!(messages[1].role, StoredRole::Assistant);
        assert_eq!(messages[1].role_info, Some(Role::ResearchAi));
        assert_eq!(messages[2].content, "third");
        assert!(messages[0].role_info.is_none());
    }

    #[tokio::test]
    async fn list_messages_scoped_to_session() {
        let db = test_db().await;
        let s1 = db.create_session("u1").await.unwrap();
        let s2 = db.create_session("u1").await.unwrap();
        db.append_message(&s1, "u1", StoredRole::User, "in s1", None)
            .await
            .unwrap();
        db.append_message(&s2, "u1", StoredRole::User, "in s2", None)
            .await
            .unwrap();

        let messages = db.list_messages(&s1).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "in s1");
    }

    #[tokio::test]
    async fn role_answers_overwrite_on_save() {
        let db = test_db().await;
        db.save_role_answers("u1", Role::GenerateProjectIdeas, &["old".to_string()])
            .await
            .unwrap();
        db.save_role_answers(
            "u1",
            Role::GenerateProjectIdeas,
            &["new answer".to_string()],
        )
        .await
        .unwrap();

        let loaded = db
            .load_role_answers("u1", Role::GenerateProjectIdeas)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, vec!["new answer".to_string()]);
    }

    #[tokio::test]
    async fn role_answers_missing_is_none() {
        let db = test_db().await;
        let loaded = db
            .load_role_answers("u1", Role::ProjectCounselor)
            .await
            .unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn user_data_maps_all_roles() {
        let db = test_db().await;
        db.save_role_answers("u1", Role::ResearchAi, &["nlp".to_string()])
            .await
            .unwrap();
        db.save_role_answers("u1", Role::ResearchFormat, &["biology".to_string()])
            .await
            .unwrap();
        db.save_role_answers("other", Role::ResearchAi, &["vision".to_string()])
            .await
            .unwrap();

        let data = db.load_user_data("u1").await.unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[&Role::ResearchAi], vec!["nlp".to_string()]);
        assert_eq!(data[&Role::ResearchFormat], vec!["biology".to_string()]);
    }

    #[tokio::test]
    async fn state_round_trip() {
        let db = test_db().await;
        let session = db.create_session("u1").await.unwrap();
        assert!(db.load_state(&session).await.unwrap().is_none());

        let mut state = ConversationState::default();
        state.start_role(Role::InDepthKnowledge);
        db.save_state(&session, &state).await.unwrap();

        let loaded = db.load_state(&session).await.unwrap().unwrap();
        assert_eq!(loaded.current_role, Some(Role::InDepthKnowledge));
        assert!(!loaded.questions_asked);

        // Saving again overwrites
        state.clear_role();
        db.save_state(&session, &state).await.unwrap();
        let loaded = db.load_state(&session).await.unwrap().unwrap();
        assert!(loaded.current_role.is_none());
    }

    #[tokio::test]
    async fn clear_session_removes_messages_and_state() {
        let db = test_db().await;
        let session = db.create_session("u1").await.unwrap();
        db.append_message(&session, "u1", StoredRole::User, "hello", None)
            .await
            .unwrap();
        db.save_state(&session, &ConversationState::default())
            .await
            .unwrap();

        db.clear_session(&session).await.unwrap();

        assert!(db.list_messages(&session).await.unwrap().is_empty());
        assert!(db.load_state(&session).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn local_file_backend_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        let session = {
            let db = LibSqlBackend::new_local(&path).await.unwrap();
            let session = db.create_session("u1").await.unwrap();
            db.append_message(&session, "u1", StoredRole::User, "persisted", None)
                .await
                .unwrap();
            session
        };

        let db = LibSqlBackend::new_local(&path).await.unwrap();
        let messages = db.list_messages(&session).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "persisted");
    }
}
