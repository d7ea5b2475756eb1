//! Intent classification — maps raw user text to a closed set of labels.
//!
//! The classifier is a pure function of the text plus fixed keyword tables:
//! greetings are checked first (token match, then substring match for
//! multi-word greetings), then an ordered phrase table is scanned with
//! whole-word regex matching. First match wins; table order is part of the
//! contract. Anything unmatched falls through to `GeneralAssistant`.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Classifier output label driving state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Yes,
    No,
    Role(Role),
    GeneralAssistant,
}

/// Greeting vocabulary. Single words match on token split; the multi-word
/// entries are caught by the substring pass.
const GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
];

/// Ordered phrase table. Scanned top to bottom, phrases in list order;
/// the first whole-word match decides the intent. Role phrases deliberately
/// precede Yes/No so that "yes i need a project idea" starts the workflow
/// instead of confirming one.
const PHRASE_TABLE: &[(Intent, &[&str])] = &[
    (
        Intent::Role(Role::GenerateProjectIdeas),
        &[
            "project idea",
            "developing projects",
            "project suggestions",
            "generate project ideas",
            "i need a project idea",
        ],
    ),
    (
        Intent::Role(Role::InDepthKnowledge),
        &[
            "depth in knowledge",
            "detailed explanation",
            "learn more about",
            "in-depth knowledge",
        ],
    ),
    (
        Intent::Role(Role::ResearchAi),
        &["research idea", "ai research", "study ai topics", "research ai"],
    ),
    (
        Intent::Role(Role::ResearchFormat),
        &["research format", "structure research", "writing research paper"],
    ),
    (
        Intent::Role(Role::ResearchDepthKnowledge),
        &["research content", "deep dive into research", "research-depth knowledge"],
    ),
    (
        Intent::Role(Role::ProjectCounselor),
        &["project help", "project counselor", "project assistance"],
    ),
    (Intent::Yes, &["yes", "yeah", "yep"]),
    (Intent::No, &["no", "nope", "nah"]),
];

/// Whole-word patterns compiled once, preserving table order.
static COMPILED_TABLE: LazyLock<Vec<(Intent, Vec<Regex>)>> = LazyLock::new(|| {
    PHRASE_TABLE
        .iter()
        .map(|(intent, phrases)| {
            let patterns = phrases
                .iter()
                .map(|phrase| {
                    Regex::new(&format!(r"\b{}\b", regex::escape(phrase)))
                        .expect("phrase table patterns are valid regex")
                })
                .collect();
            (*intent, patterns)
        })
        .collect()
});

/// Classify a raw user message.
pub fn classify(message: &str) -> Intent {
    let message = message.to_lowercase();
    let words: HashSet<&str> = message.split_whitespace().collect();

    // Single-word greetings
    if GREETINGS.iter().any(|g| words.contains(g)) {
        return Intent::Greeting;
    }

    // Multi-word greetings not caught by the token split
    for greeting in GREETINGS.iter().filter(|g| !words.contains(*g)) {
        if message.contains(greeting) {
            return Intent::Greeting;
        }
    }

    for (intent, patterns) in COMPILED_TABLE.iter() {
        for pattern in patterns {
            if pattern.is_match(&message) {
                return *intent;
            }
        }
    }

    Intent::GeneralAssistant
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_word_greetings() {
        for text in ["hi", "Hello", "hey everyone", "HEY"] {
            assert_eq!(classify(text), Intent::Greeting, "{text}");
        }
    }

    #[test]
    fn multi_word_greetings_match_by_substring() {
        assert_eq!(classify("good morning to you"), Intent::Greeting);
        assert_eq!(classify("well, good evening!"), Intent::Greeting);
    }

    #[test]
    fn greeting_preempts_role_keywords() {
        // "hi" token wins over the project-idea phrase; greetings are
        // checked before the phrase table by contract.
        assert_eq!(
            classify("Hi there, I need a project idea"),
            Intent::Greeting
        );
    }

    #[test]
    fn role_phrases_classify() {
        assert_eq!(
            classify("can you generate project ideas for me"),
            Intent::Role(Role::GenerateProjectIdeas)
        );
        assert_eq!(
            classify("I want a detailed explanation of this"),
            Intent::Role(Role::InDepthKnowledge)
        );
        assert_eq!(classify("ai research please"), Intent::Role(Role::ResearchAi));
        assert_eq!(
            classify("help with the research format"),
            Intent::Role(Role::ResearchFormat)
        );
        assert_eq!(
            classify("a deep dive into research"),
            Intent::Role(Role::ResearchDepthKnowledge)
        );
        assert_eq!(
            classify("i could use some project assistance"),
            Intent::Role(Role::ProjectCounselor)
        );
    }

    #[test]
    fn table_order_puts_roles_before_yes() {
        // Contains both "yes" and a project-idea phrase; the role entry is
        // earlier in the table so it wins.
        assert_eq!(
            classify("yes i need a project idea"),
            Intent::Role(Role::GenerateProjectIdeas)
        );
    }

    #[test]
    fn yes_no_variants() {
        assert_eq!(classify("yes"), Intent::Yes);
        assert_eq!(classify("yeah sure"), Intent::Yes);
        assert_eq!(classify("nope"), Intent::No);
        assert_eq!(classify("nah, thanks"), Intent::No);
    }

    #[test]
    fn whole_word_matching_only() {
        // "yesterday" must not match "yes", "nothing" must not match "no".
        assert_eq!(classify("yesterday was fine"), Intent::GeneralAssistant);
        assert_eq!(classify("nothing much"), Intent::GeneralAssistant);
    }

    #[test]
    fn unmatched_text_defaults_to_general_assistant() {
        assert_eq!(
            classify("tell me about the weather"),
            Intent::GeneralAssistant
        );
        assert_eq!(classify(""), Intent::GeneralAssistant);
    }
}
