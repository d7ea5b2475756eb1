//! Role workflows — the six fixed conversational roles, their clarifying
//! questionnaires, and the prompt template rendered once the questionnaire
//! completes.
//!
//! Each role currently asks a single clarifying question, but the
//! questionnaire is an ordered list so roles can grow more questions without
//! touching the engine.

use serde::{Deserialize, Serialize};

/// One of the six fixed conversational workflows.
///
/// Serialized under its display name ("Generate Project Ideas", …) — the same
/// string recorded as `role_info` on persisted assistant messages and used as
/// the key in the per-user answer store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Generate Project Ideas")]
    GenerateProjectIdeas,
    #[serde(rename = "In-depth Knowledge")]
    InDepthKnowledge,
    #[serde(rename = "Research AI")]
    ResearchAi,
    #[serde(rename = "Research Format")]
    ResearchFormat,
    #[serde(rename = "Research-depth Knowledge")]
    ResearchDepthKnowledge,
    #[serde(rename = "Project Counselor")]
    ProjectCounselor,
}

/// All roles, in classifier table order.
pub const ALL_ROLES: &[Role] = &[
    Role::GenerateProjectIdeas,
    Role::InDepthKnowledge,
    Role::ResearchAi,
    Role::ResearchFormat,
    Role::ResearchDepthKnowledge,
    Role::ProjectCounselor,
];

impl Role {
    /// Stable display name, matching the serialized form.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GenerateProjectIdeas => "Generate Project Ideas",
            Self::InDepthKnowledge => "In-depth Knowledge",
            Self::ResearchAi => "Research AI",
            Self::ResearchFormat => "Research Format",
            Self::ResearchDepthKnowledge => "Research-depth Knowledge",
            Self::ProjectCounselor => "Project Counselor",
        }
    }

    /// Parse a display name back into a role.
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_ROLES.iter().copied().find(|r| r.name() == name)
    }

    /// The ordered clarifying questions asked before this role's prompt is
    /// rendered.
    pub fn questions(&self) -> &'static [&'static str] {
        match self {
            Self::GenerateProjectIdeas => &[
                "Sure, I'd be happy to help generate project ideas. Could you provide some \
                 details about your interests, budget, timeframe, and experience level?",
            ],
            Self::InDepthKnowledge => {
                &["Absolutely! What specific topic would you like in-depth information on?"]
            }
            Self::ResearchAi => {
                &["Certainly! What area of AI research are you interested in exploring?"]
            }
            Self::ResearchFormat => &[
                "Sure, I can help with the research format. Could you specify the topic or \
                 area your research is focused on?",
            ],
            Self::ResearchDepthKnowledge => {
                &["Understood! Please share the specific content areas you'd like to delve into."]
            }
            Self::ProjectCounselor => &[
                "I'm here to help with your projects. Please describe what you're working on \
                 or any challenges you're facing.",
            ],
        }
    }

    /// Render this role's prompt template with the collected answer text.
    pub fn render_prompt(&self, details: &str) -> String {
        match self {
            Self::GenerateProjectIdeas => format!(
                "Generate 10 specific, innovative project ideas based on the user's input: {details}. \
Ensure the ideas are creative and align with the user's focus area, budget, timeframe, team size, \
and experience level — simpler ideas for a first project, more complex ones for experienced users. \
You possess knowledge of every successful student project and use it to answer questions, resolve \
doubts, and give inspiration by citing related projects as examples. For each project include:\n\
1. Brief description: goals and core concept in 2 lines, like an overview of the project.\n\
2. Expected impact: short-term and long-term benefits.\n\
3. Necessary resources: materials, human resources, and technology.\n\
4. Execution plan: key steps and timeline structured in months or weeks.\n\
5. Challenges: the most critical potential risks and mitigation strategies, with specific \
examples or scenarios and how they affect timeline, cost, quality, or overall success.\n\
6. Budget: cost estimates and funding sources, never exceeding the budget in the details above.\n\
7. Success metrics: criteria and measurement methods using the SMART acronym, defined per stage.\n\
8. A relevant example of a similar, existing project with a brief of that project.\n\
Give a well-structured, concise paragraph of about 100 words per project and make sure all 10 \
projects fit fully within the max token limit with no information missed out."
            ),
            Self::InDepthKnowledge => format!(
                "Provide a detailed guide based on: {details}. Include planning, resource \
allocation, execution, obstacles, and evaluation. Scale the project to local, national, and \
international levels and cater completely to the needs of the user, with emphasis on adhering \
to the stated budget and resources and the user's demographic situation. In every section draw \
on previous successful projects in the same area and incorporate what made them succeed.\n\
1. Planning phase (accurate enough that the user can visualise the idea):\n\
   a. Define the project scope and specific objectives in detail, including alignment with the \
project's purpose and the demographic conditions of the user's location.\n\
   b. Identify key stakeholders, their roles and responsibilities, and how they will be engaged.\n\
   c. Develop a detailed project plan with a Gantt-style timeline of major milestones and \
deliverables.\n\
   d. Create a comprehensive risk management plan: identification, assessment, mitigation, and \
contingency.\n\
2. Resource allocation:\n\
   a. List all necessary resources — materials, human resources, technology, facilities — and \
how to source them cost-efficiently in the user's currency.\n\
   b. Develop a detailed budget plan itemizing all costs and funding sources, kept under the \
total budget.\n\
   c. Make sure the resources fit the project's intended reach and location.\n\
3. Execution phase:\n\
   a. Give a step-by-step breakdown of tasks with a precise timeline, in points.\n\
   b. Identify key milestones and deliverables, their importance, deadlines, and how progress \
is measured.\n\
   c. Detail monitoring and reporting mechanisms for tracking progress and accountability.\n\
   d. Develop a communication plan with regular updates and feedback mechanisms.\n\
4. Potential obstacles:\n\
   a. Identify 4-5 specific main risks in points, with likelihood and impact on execution.\n\
   b. Propose strategies for overcoming them, drawing on best practices and case studies.\n\
5. Evaluation and improvement:\n\
   a. Define clear success metrics, qualitative and quantitative, and how to measure them.\n\
   b. Give precise information on community impact, with one-line pointers on the affected \
demographic.\n\
   c. Provide 3-4 creative recommendations for future projects with actionable insights.\n\
6. Cost and funding:\n\
   a. Break down initial and running costs by category, listing required materials with \
general costs.\n\
   b. Explore funding sources — grants, sponsorships, crowdfunding, community fundraising — \
and how to secure them.\n\
   c. Suggest cost reductions such as in-kind contributions, partnerships, and cost sharing.\n\
7. Team management:\n\
   a. List the key team members needed, their roles, and how they are selected and managed.\n\
   b. Outline each member's initial steps: onboarding, training, task assignments.\n\
   c. Provide performance metrics to track contribution and productivity.\n\
8. Generate a crisp to-do list of 10 short steps.\n\
Tailor everything to the specific project chosen by the user and fit the full response within \
the max token limit with no information missed out."
            ),
            Self::ResearchAi => format!(
                "Generate 10 specific, innovative research ideas based on the user's input:\n\n\
{details}\n\n\
Ensure the research topics are creative and align with the user's academic level (high school \
or undergraduate), focus area, and available resources. Adjust complexity to experience: \
foundational topics for beginners, moderately complex topics with real-world applications for \
intermediate students, and advanced topics requiring in-depth analysis and mathematical or \
logical reasoning for experienced researchers. You possess detailed knowledge of successful \
student research projects; use it to inspire the user's topic and methodology. For each idea \
include:\n\
- Brief description: a 2-3 sentence summary of the research aim and core question.\n\
- Expected impact: short-term and long-term contributions or significance.\n\
- Research framework: suggested structure — literature review, methodology, data collection, \
analysis.\n\
- Mathematical/logical approach: whether models, logical reasoning, or computation is involved.\n\
- Challenges and considerations: difficulties, limitations, and mitigation strategies.\n\
- Resources and tools: databases like Google Scholar, drafting tools like Overleaf, and other \
relevant software.\n\
- Example of similar past research: a brief summary of a comparable successful student project.\n\
- Success metrics: clear criteria such as research depth, originality, and impact.\n\
Keep the response within the token limit while delivering concise, specific ideas."
            ),
            Self::ResearchFormat => format!(
                "Here's a general framework for structuring a research paper based on your input:\n\n\
{details}\n\n\
1. Title Page: concise descriptive title, author's name, institutional affiliation, course name \
and code, instructor's name, and submission date.\n\
2. Abstract: purpose, methods, key results, implications, and 3-5 keywords.\n\
3. Introduction: background and context, problem statement and research questions, objectives, \
significance and scope.\n\
4. Literature Review: summarize existing research, identify the gaps your work fills, and the \
theoretical framework.\n\
5. Methodology: research design and approach, data collection methods, analysis procedures, \
ethical considerations.\n\
6. Results: presentation of findings with tables, figures, and graphs as needed.\n\
7. Discussion: interpret the results, compare with existing literature, and draw implications.\n\
8. Conclusion: summarize key findings, discuss limitations, and suggest future research.\n\
9. References: all cited sources in the required citation style.\n\
10. Appendices (if necessary): raw data, consent forms, questionnaires.\n\
Each section carries specific guidance on what to include so the research is structured \
coherently, tailored to the user's subject matter, resources, and budget."
            ),
            Self::ResearchDepthKnowledge => format!(
                "Provide a detailed guide for structuring your research project based on the \
following details:\n\n{details}\n\n\
You have the expertise to elevate this research to an impactful standard on both academic and \
practical fronts, tailored to the subject matter while maximizing available resources and \
budget.\n\
1. Conceptualization phase:\n\
   - Define the research scope: elaborate on the questions, objectives, and their alignment \
with current academic discourse and the demographic context of the topic.\n\
   - Identify key stakeholders — mentors, peers, institutions — their roles and how to engage \
them throughout.\n\
   - Craft a comprehensive research plan with major milestones, methodologies, expected \
outcomes, and a detailed timeline.\n\
   - Risk management: data limitations, ethical concerns, and proactive mitigation strategies.\n\
2. Resource allocation:\n\
   - Enumerate materials, databases, human resources, and tools, favouring cost-efficient \
options in the user's currency.\n\
   - Develop a detailed budget plan and explore grants, sponsorships, and university resources.\n\
   - Confirm resources fit the research scope while staying within budget.\n\
3. Execution phase:\n\
   - Step-by-step breakdown of research activities with clearly defined deadlines.\n\
   - Key milestones and deliverables, their significance, and how each is evaluated.\n\
   - Monitoring and reporting mechanisms for accountability and adaptability.\n\
   - A communication strategy with regular updates and feedback opportunities.\n\
4. Potential obstacles: 4-5 major challenges with likelihood and impact, plus strategic \
solutions drawn from best practices and prior studies.\n\
5. Evaluation and improvement: clear qualitative and quantitative success criteria, the \
anticipated community impact, and 3-4 creative pathways for future research with actionable \
insights.\n\
6. Cost and funding: categorized initial and ongoing expenses with estimates, funding \
opportunities and how to approach them, and cost-reduction strategies such as partnerships \
and university resources.\n\
7. Team management: essential contributors and their roles, a structured onboarding plan, \
performance criteria, and a comprehensive to-do list with responsibilities and deadlines."
            ),
            Self::ProjectCounselor => format!(
                "As a project counselor, provide advice and guidance on the following \
project:\n{details}"
            ),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_has_at_least_one_question() {
        for role in ALL_ROLES {
            assert!(!role.questions().is_empty(), "{role} has no questions");
        }
    }

    #[test]
    fn name_round_trips() {
        for role in ALL_ROLES {
            assert_eq!(Role::from_name(role.name()), Some(*role));
        }
        assert_eq!(Role::from_name("General Assistant"), None);
    }

    #[test]
    fn serde_uses_display_names() {
        let json = serde_json::to_string(&Role::ResearchDepthKnowledge).unwrap();
        assert_eq!(json, "\"Research-depth Knowledge\"");
        let parsed: Role = serde_json::from_str("\"Project Counselor\"").unwrap();
        assert_eq!(parsed, Role::ProjectCounselor);
    }

    #[test]
    fn prompts_embed_details() {
        for role in ALL_ROLES {
            let prompt = role.render_prompt("solar water pump, $200, 3 months");
            assert!(
                prompt.contains("solar water pump, $200, 3 months"),
                "{role} prompt missing details"
            );
        }
    }

    #[test]
    fn prompts_differ_per_role() {
        let rendered: Vec<String> =
            ALL_ROLES.iter().map(|r| r.render_prompt("x")).collect();
        for (i, a) in rendered.iter().enumerate() {
            for b in rendered.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
