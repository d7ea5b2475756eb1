//! Response generation — the turn-by-turn conversation state machine.
//!
//! Each turn: classify the message, decide whether it starts a role
//! workflow, answers a pending questionnaire, confirms or declines
//! continuation, or falls through to open-ended assistance; then either
//! return canned question text or render a prompt and call the generation
//! service. Generation failures are converted to fixed apology strings and
//! returned as the reply — this component never raises them.

use std::sync::Arc;

use tracing::{debug, error};

use crate::conversation::ConversationState;
use crate::error::DatabaseError;
use crate::intent::{Intent, classify};
use crate::llm::{CompletionRequest, LlmProvider, bounded_context, user_facing_error};
use crate::role::Role;
use crate::store::Database;

/// Fixed sentence appended to every role-templated reply, keeping the user
/// in the questionnaire-continuation loop.
pub const TRAILER: &str = " Do you have any queries about the above response?";

/// Reply returned on an explicit decline, without a generation call.
pub const DECLINE_REPLY: &str = "What else can I help you with?";

/// Composes classifier, state store, questionnaire engine, and prompt
/// rendering into a single `respond` entry point.
pub struct ChatEngine {
    store: Arc<dyn Database>,
    llm: Arc<dyn LlmProvider>,
    model: String,
}

impl ChatEngine {
    pub fn new(store: Arc<dyn Database>, llm: Arc<dyn LlmProvider>, model: String) -> Self {
        Self { store, llm, model }
    }

    /// Run one conversation turn.
    ///
    /// Mutates `state` in place; the caller persists it back to the session
    /// store. Persistence failures are fatal to the turn; generation
    /// failures are absorbed into the reply text.
    pub async fn respond(
        &self,
        user_id: &str,
        session_id: &str,
        message: &str,
        state: &mut ConversationState,
    ) -> Result<String, DatabaseError> {
        let intent = classify(message);
        debug!(?intent, session_id, "Intent identified");

        let reply = if let (Intent::Yes | Intent::No, Some(role)) = (intent, state.current_role)
        {
            match intent {
                Intent::Yes if !state.questions_asked => {
                    // Mid-questionnaire "yes" is just the next answer.
                    self.handle_role_questions(user_id, session_id, message, role, state)
                        .await?
                }
                Intent::Yes => {
                    // Re-invoke the role's prompt with the new message plus
                    // any answers persisted for this role.
                    let prior = self
                        .store
                        .load_role_answers(user_id, role)
                        .await?
                        .unwrap_or_default()
                        .join(" ");
                    let details = format!("{message} {prior}").trim().to_string();
                    self.role_reply(session_id, role, &details).await?
                }
                _ => {
                    state.clear_role();
                    DECLINE_REPLY.to_string()
                }
            }
        } else if state.questionnaire_pending() {
            // An active questionnaire consumes every message as an answer,
            // regardless of what the classifier says.
            let role = state.current_role.ok_or_else(|| DatabaseError::NotFound {
                entity: "active role".to_string(),
                id: session_id.to_string(),
            })?;
            self.handle_role_questions(user_id, session_id, message, role, state)
                .await?
        } else if let Intent::Role(role) = intent {
            state.start_role(role);
            self.ask_role_questions(session_id, role, state).await?
        } else {
            // General assistance (also greetings with no active role): raw
            // message as the prompt, no role template, no trailer.
            state.clear_role();
            self.general_reply(session_id, message).await?
        };

        state.previous_intent = intent;
        Ok(reply)
    }

    /// Start a role questionnaire: return the first question, or render the
    /// prompt immediately when the role has no questions.
    async fn ask_role_questions(
        &self,
        session_id: &str,
        role: Role,
        state: &mut ConversationState,
    ) -> Result<String, DatabaseError> {
        match state.pending_questions.first() {
            Some(first) => Ok(first.clone()),
            None => {
                state.questions_asked = true;
                self.role_reply(session_id, role, "").await
            }
        }
    }

    /// Record an answer; return the next question or, when the
    /// questionnaire completes, persist the answer set and render the
    /// role's prompt.
    async fn handle_role_questions(
        &self,
        user_id: &str,
        session_id: &str,
        answer: &str,
        role: Role,
        state: &mut ConversationState,
    ) -> Result<String, DatabaseError> {
        state.collected_answers.push(answer.to_string());

        if let Some(next) = state.pending_questions.get(state.collected_answers.len()) {
            return Ok(next.clone());
        }

        state.questions_asked = true;
        self.store
            .save_role_answers(user_id, role, &state.collected_answers)
            .await?;
        let details = state.collected_answers.join(" ");
        self.role_reply(session_id, role, &details).await
    }

    /// Render the role's template, call the generation service with the
    /// bounded session history, and append the trailer.
    async fn role_reply(
        &self,
        session_id: &str,
        role: Role,
        details: &str,
    ) -> Result<String, DatabaseError> {
        let prompt = role.render_prompt(details);
        let mut reply = self.generate(session_id, &prompt).await?;
        reply.push_str(TRAILER);
        Ok(reply)
    }

    /// General-assistance path: the raw message is the prompt.
    async fn general_reply(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<String, DatabaseError> {
        self.generate(session_id, message).await
    }

    /// Call the generation service. Failures become fixed apology strings.
    async fn generate(&self, session_id: &str, prompt: &str) -> Result<String, DatabaseError> {
        let history = self.store.list_messages(session_id).await?;
        let messages = bounded_context(&history, prompt);
        let request = CompletionRequest::new(self.model.clone(), messages);

        match self.llm.complete(request).await {
            Ok(completion) => Ok(completion.content),
            Err(e) => {
                error!(provider = self.llm.name(), error = %e, "Generation call failed");
                Ok(user_facing_error(&e).to_string())
            }
        }
    }
}
