//! Conversation core — per-session state and the response state machine.

pub mod engine;
pub mod state;

pub use engine::{ChatEngine, DECLINE_REPLY, TRAILER};
pub use state::ConversationState;
