//! HTTP surface — the chat, history, and clear endpoints.
//!
//! Authentication is an external collaborator: requests carry an opaque
//! `user_id`. The chat handler owns the turn lifecycle: ensure a session,
//! persist the user message, load state, run the engine, persist the reply
//! and state. A turn that fails to persist does not claim success.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::conversation::ChatEngine;
use crate::error::DatabaseError;
use crate::store::{Database, StoredRole};

/// Shared state for the chat routes.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Database>,
    pub engine: Arc<ChatEngine>,
}

/// Build the application router.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/chat/history", get(history))
        .route("/api/chat/clear", post(clear))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    /// Omitted on the first turn; a session is created lazily.
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct MessageDto {
    pub role: &'static str,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_info: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ClearRequest {
    pub user_id: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub new_session_id: String,
}

/// Database failures abort the turn with a 500.
struct ApiError(DatabaseError);

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "internal error" })),
        )
            .into_response()
    }
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /api/chat — run one conversation turn.
async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let session_id = match req.session_id {
        Some(id) => id,
        None => state.store.create_session(&req.user_id).await?,
    };

    state
        .store
        .append_message(&session_id, &req.user_id, StoredRole::User, &req.message, None)
        .await?;

    let mut conv_state = state
        .store
        .load_state(&session_id)
        .await?
        .unwrap_or_default();

    let reply = state
        .engine
        .respond(&req.user_id, &session_id, &req.message, &mut conv_state)
        .await?;

    state
        .store
        .append_message(
            &session_id,
            &req.user_id,
            StoredRole::Assistant,
            &reply,
            conv_state.current_role,
        )
        .await?;
    state.store.save_state(&session_id, &conv_state).await?;

    Ok(Json(ChatResponse { session_id, reply }))
}

/// GET /api/chat/history — ordered messages for a session.
async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    let messages = state.store.list_messages(&params.session_id).await?;
    let dtos = messages
        .into_iter()
        .map(|m| MessageDto {
            role: m.role.as_str(),
            content: m.content,
            role_info: m.role_info.map(|r| r.name().to_string()),
            timestamp: m.timestamp,
        })
        .collect();
    Ok(Json(dtos))
}

/// POST /api/chat/clear — wipe a session's messages and questionnaire
/// state, minting a fresh session.
async fn clear(
    State(state): State<AppState>,
    Json(req): Json<ClearRequest>,
) -> Result<Json<ClearResponse>, ApiError> {
    state.store.clear_session(&req.session_id).await?;
    let new_session_id = state.store.create_session(&req.user_id).await?;
    Ok(Json(ClearResponse { new_session_id }))
}
