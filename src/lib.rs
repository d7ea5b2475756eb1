//! Project Assist — intent-routed project mentoring chat backend.

pub mod config;
pub mod conversation;
pub mod error;
pub mod http;
pub mod intent;
pub mod llm;
pub mod role;
pub mod store;
