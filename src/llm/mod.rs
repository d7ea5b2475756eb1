//! Generation-service integration.
//!
//! The service is treated as an opaque text-completion dependency behind the
//! `LlmProvider` trait. This module owns the request/response types, the
//! bounded context-window builder, and the mapping from provider errors to
//! the fixed user-facing apology strings. The engine never surfaces an
//! `LlmError` to the caller — only text.

pub mod openai;

use async_trait::async_trait;

use crate::error::LlmError;
use crate::store::{StoredChatMessage, StoredRole};

pub use openai::OpenAiProvider;

/// Completion tokens requested on every call.
pub const MAX_TOKENS: u32 = 1000;
/// Sampling temperature used on every call.
pub const TEMPERATURE: f32 = 0.6;
/// At most this many trailing history entries enter the context window.
pub const HISTORY_WINDOW: usize = 5;
/// History entries longer than this are dropped from the context window.
pub const MAX_HISTORY_CHARS: usize = 1000;
/// History entries containing this marker are dropped (pasted code blocks).
const CODE_MARKER: &str = "<code>";

/// Role vocabulary of the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One turn in a completion request.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A completion request: fixed model, bounded message list, fixed sampling
/// parameters, single completion, no stop sequence.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

/// A successful completion.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Trimmed completion text.
    pub content: String,
}

/// Opaque text-generation provider.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run a single blocking completion. No retries on any failure class.
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError>;

    /// Provider name used in error reporting.
    fn name(&self) -> &str;
}

/// Build the bounded message list for a generation call.
///
/// Takes the last [`HISTORY_WINDOW`] history entries, drops any whose content
/// contains a newline or an embedded `<code>` marker or exceeds
/// [`MAX_HISTORY_CHARS`] characters, maps each survivor onto the service's
/// two-role vocabulary, and appends `prompt` as the final user turn. The
/// filtering keeps degenerate inputs (pasted code blocks, oversized turns)
/// out of the model context.
pub fn bounded_context(history: &[StoredChatMessage], prompt: &str) -> Vec<ChatMessage> {
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    let mut messages: Vec<ChatMessage> = history[start..]
        .iter()
        .filter(|m| {
            !m.content.contains('\n')
                && !m.content.contains(CODE_MARKER)
                && m.content.len() <= MAX_HISTORY_CHARS
        })
        .map(|m| match m.role {
            StoredRole::Assistant => ChatMessage::assistant(m.content.clone()),
            StoredRole::User => ChatMessage::user(m.content.clone()),
        })
        .collect();

    messages.push(ChatMessage::user(prompt));
    messages
}

/// Map a generation failure to its fixed user-facing reply text.
///
/// Distinct strings per failure class; the error itself is logged, never
/// propagated.
pub fn user_facing_error(err: &LlmError) -> &'static str {
    match err {
        LlmError::AuthFailed { .. } => "Error: Invalid API key.",
        LlmError::RateLimited { .. } => "Error: Rate limit exceeded, try again later.",
        LlmError::RequestFailed { .. } | LlmError::InvalidResponse { .. } => {
            "An unexpected error occurred while generating a response."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn entry(role: StoredRole, content: &str) -> StoredChatMessage {
        StoredChatMessage {
            id: Uuid::new_v4().to_string(),
            session_id: "s1".to_string(),
            user_id: "u1".to_string(),
            role,
            content: content.to_string(),
            role_info: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn context_keeps_at_most_five_entries() {
        let history: Vec<_> = (0..8)
            .map(|i| entry(StoredRole::User, &format!("message {i}")))
            .collect();
        let messages = bounded_context(&history, "the prompt");
        // 5 history entries + the prompt turn
        assert_eq!(messages.len(), 6);
        assert_eq!(messages[0].content, "message 3");
        assert_eq!(messages.last().unwrap().content, "the prompt");
    }

    #[test]
    fn context_drops_newlines_code_and_oversized() {
        let history = vec![
            entry(StoredRole::User, "fine"),
            entry(StoredRole::User, "has a\nnewline"),
            entry(StoredRole::User, "look: <code>fn main(){}</code>"),
            entry(StoredRole::User, &"x".repeat(1001)),
            entry(StoredRole::Assistant, "also fine"),
        ];
        let messages = bounded_context(&history, "p");
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "fine");
        assert_eq!(messages[1].content, "also fine");
        assert_eq!(messages[1].role, ChatRole::Assistant);
    }

    #[test]
    fn context_keeps_exactly_1000_chars() {
        let history = vec![entry(StoredRole::User, &"y".repeat(1000))];
        let messages = bounded_context(&history, "p");
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn prompt_is_final_user_turn() {
        let messages = bounded_context(&[], "hello there");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, ChatRole::User);
        assert_eq!(messages[0].content, "hello there");
    }

    #[test]
    fn apology_strings_are_distinct_per_failure_class() {
        let auth = user_facing_error(&LlmError::AuthFailed {
            provider: "openai".into(),
        });
        let rate = user_facing_error(&LlmError::RateLimited {
            provider: "openai".into(),
            retry_after: None,
        });
        let generic = user_facing_error(&LlmError::RequestFailed {
            provider: "openai".into(),
            reason: "boom".into(),
        });
        assert_eq!(auth, "Error: Invalid API key.");
        assert_eq!(rate, "Error: Rate limit exceeded, try again later.");
        assert_ne!(auth, rate);
        assert_ne!(rate, generic);
        assert_ne!(auth, generic);
    }
}
