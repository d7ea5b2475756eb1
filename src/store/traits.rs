//! Backend-agnostic `Database` trait — the persistence collaborator.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::conversation::ConversationState;
use crate::error::DatabaseError;
use crate::role::Role;

/// Author of a stored chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredRole {
    User,
    Assistant,
}

impl StoredRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

/// A persisted chat message. Owned by its session, append-only.
#[derive(Debug, Clone)]
pub struct StoredChatMessage {
    pub id: String,
    pub session_id: String,
    pub user_id: String,
    pub role: StoredRole,
    pub content: String,
    /// Role workflow that produced an assistant message, if any.
    pub role_info: Option<Role>,
    pub timestamp: DateTime<Utc>,
}

/// Persistence operations for sessions, messages, per-role answers, and
/// conversation state.
#[async_trait]
pub trait Database: Send + Sync {
    /// Create a new chat session for a user. Returns the session id.
    async fn create_session(&self, user_id: &str) -> Result<String, DatabaseError>;

    /// Append a message to a session. Returns the generated message id.
    async fn append_message(
        &self,
        session_id: &str,
        user_id: &str,
        role: StoredRole,
        content: &str,
        role_info: Option<Role>,
    ) -> Result<String, DatabaseError>;

    /// List a session's messages ordered by timestamp (insertion order on
    /// ties).
    async fn list_messages(
        &self,
        session_id: &str,
    ) -> Result<Vec<StoredChatMessage>, DatabaseError>;

    /// Store a user's completed answer set for a role, overwriting any
    /// previous set for that role.
    async fn save_role_answers(
        &self,
        user_id: &str,
        role: Role,
        answers: &[String],
    ) -> Result<(), DatabaseError>;

    /// Load a user's most recent answer set for a role.
    async fn load_role_answers(
        &self,
        user_id: &str,
        role: Role,
    ) -> Result<Option<Vec<String>>, DatabaseError>;

    /// Load all of a user's stored answer sets.
    async fn load_user_data(
        &self,
        user_id: &str,
    ) -> Result<HashMap<Role, Vec<String>>, DatabaseError>;

    /// Load the conversation state for a session, if one was saved.
    async fn load_state(
        &self,
        session_id: &str,
    ) -> Result<Option<ConversationState>, DatabaseError>;

    /// Persist the conversation state for a session.
    async fn save_state(
        &self,
        session_id: &str,
        state: &ConversationState,
    ) -> Result<(), DatabaseError>;

    /// Delete a session's messages and state (chat-clear).
    async fn clear_session(&self, session_id: &str) -> Result<(), DatabaseError>;
}
