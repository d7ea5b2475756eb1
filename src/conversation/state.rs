//! Per-session conversation state.
//!
//! A plain value passed into and returned from the engine each turn — no
//! ambient session mutation. The HTTP layer loads it before the turn and
//! persists it back afterwards.

use serde::{Deserialize, Serialize};

use crate::intent::Intent;
use crate::role::Role;

/// Mutable per-session state for the role questionnaire flow.
///
/// Invariant: `collected_answers.len() <= pending_questions.len()`; when the
/// two are equal after a questionnaire ran, `questions_asked` is true.
/// `current_role` is `None` whenever no questionnaire is pending and
/// `questions_asked` is false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    /// The active role workflow, if any.
    pub current_role: Option<Role>,
    /// Questions queued for the active role, in ask order.
    pub pending_questions: Vec<String>,
    /// Answers collected so far, parallel to `pending_questions`.
    pub collected_answers: Vec<String>,
    /// True once the active role's questionnaire has fully completed.
    pub questions_asked: bool,
    /// Intent classified on the previous turn (diagnostics only).
    pub previous_intent: Intent,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            current_role: None,
            pending_questions: Vec::new(),
            collected_answers: Vec::new(),
            questions_asked: false,
            previous_intent: Intent::GeneralAssistant,
        }
    }
}

impl ConversationState {
    /// Begin a role questionnaire: queue its questions, reset answers.
    pub fn start_role(&mut self, role: Role) {
        self.current_role = Some(role);
        self.pending_questions = role.questions().iter().map(|q| q.to_string()).collect();
        self.collected_answers.clear();
        self.questions_asked = false;
    }

    /// Clear all role/questionnaire fields (decline, logout, chat-clear).
    pub fn clear_role(&mut self) {
        self.current_role = None;
        self.pending_questions.clear();
        self.collected_answers.clear();
        self.questions_asked = false;
    }

    /// Whether a role is active with an unfinished questionnaire.
    pub fn questionnaire_pending(&self) -> bool {
        self.current_role.is_some() && !self.questions_asked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle() {
        let state = ConversationState::default();
        assert!(state.current_role.is_none());
        assert!(state.pending_questions.is_empty());
        assert!(state.collected_answers.is_empty());
        assert!(!state.questions_asked);
        assert_eq!(state.previous_intent, Intent::GeneralAssistant);
    }

    #[test]
    fn start_role_queues_questions() {
        let mut state = ConversationState::default();
        state.start_role(Role::ResearchAi);
        assert_eq!(state.current_role, Some(Role::ResearchAi));
        assert_eq!(state.pending_questions.len(), Role::ResearchAi.questions().len());
        assert!(state.collected_answers.is_empty());
        assert!(state.questionnaire_pending());
    }

    #[test]
    fn start_role_resets_previous_answers() {
        let mut state = ConversationState::default();
        state.start_role(Role::ProjectCounselor);
        state.collected_answers.push("an answer".to_string());
        state.start_role(Role::ResearchFormat);
        assert!(state.collected_answers.is_empty());
        assert!(!state.questions_asked);
    }

    #[test]
    fn clear_role_resets_everything() {
        let mut state = ConversationState::default();
        state.start_role(Role::GenerateProjectIdeas);
        state.collected_answers.push("robotics".to_string());
        state.questions_asked = true;
        state.clear_role();
        assert!(state.current_role.is_none());
        assert!(state.pending_questions.is_empty());
        assert!(state.collected_answers.is_empty());
        assert!(!state.questions_asked);
    }

    #[test]
    fn answers_never_exceed_questions_in_normal_flow() {
        let mut state = ConversationState::default();
        state.start_role(Role::InDepthKnowledge);
        for _ in 0..state.pending_questions.len() {
            state.collected_answers.push("answer".to_string());
        }
        assert!(state.collected_answers.len() <= state.pending_questions.len());
    }

    #[test]
    fn serde_round_trip() {
        let mut state = ConversationState::default();
        state.start_role(Role::ResearchDepthKnowledge);
        state.collected_answers.push("genomics".to_string());
        state.previous_intent = Intent::Yes;

        let json = serde_json::to_string(&state).unwrap();
        let parsed: ConversationState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.current_role, Some(Role::ResearchDepthKnowledge));
        assert_eq!(parsed.collected_answers, vec!["genomics".to_string()]);
        assert_eq!(parsed.previous_intent, Intent::Yes);
        assert!(!parsed.questions_asked);
    }
}
