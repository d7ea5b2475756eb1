//! Persistence layer — libSQL-backed storage for sessions, messages,
//! per-role answers, and conversation state.

pub mod libsql_backend;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::{Database, StoredChatMessage, StoredRole};
