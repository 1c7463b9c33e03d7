//! Prompt rendering from session state
//!
//! Pure transformation from one tutoring-session snapshot to the
//! (system prompt, user prompt) pair sent to a model backend. Same inputs
//! always render byte-identical output.

use crate::normalize::StringOrList;

const PROMPT_TEMPLATE: &str = "
Here are some examples of responses.

{few-shot-examples}

This is the equation your child is working on: {problem}. They need to solve for x.

{correct-steps-statement}

{hint-statement}

{incorrect-steps-statement}

Here are suggested next steps:
{next-steps}

This problem is examining the following knowledge components (KC). The following are KC's being tested in the problem using the <KC name>: <KC definition> format:
{knowledge-components-statement}

The elements in this list are messages that have been sent in a conversation between a middle school student and their parent about a math problem (in order).
Use these messages to generate 1 to 2 sentence responses that a parent would say to their child at this point in the conversation.
Include a short justifications in square brackets at the start of each message, such as [Ask to self explain] \"Tell me what you mean\",
[Praise your child for a correct attempt] \"Great job on solving that math problem.\", [Your child has made an error] \"I appreciate your effort.\"
Do not include quotation marks. Do not give away the answer. Do not directly point out errors. Generate 3 different responses, separated by the # symbol, like this: message 1 # message 2 # message 3 #
Use the tone that the parent has been using in previous messages to generate messages with similar tone. This is the list, delimited with square brackets: [
{chat-history}
]
";

/// Session state consumed by the prompt formatter
#[derive(Debug, Clone)]
pub struct SessionState {
    pub current_problem: String,
    pub chat_history: Vec<String>,
    pub correct_step_history: StringOrList,
    pub incorrect_step_history: StringOrList,
    pub hints: StringOrList,
    pub suggested_next_steps: Vec<String>,
    /// (KC id, KC definition) pairs, order preserved
    pub knowledge_components: Vec<(String, String)>,
}

/// Rendered prompt pair, produced once per request and consumed once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system_prompt: String,
    pub user_prompt: String,
}

impl PromptPair {
    /// Diagnostic echo of everything sent to the backend
    pub fn full_text(&self) -> String {
        format!("{}{}", self.system_prompt, self.user_prompt)
    }
}

/// Render the prompt pair for one session
///
/// The system prompt is the tutor's persona statement verbatim; the user
/// prompt is the fixed template with the session data substituted in.
pub fn format_prompt(
    persona_statement: &str,
    few_shot_examples: &str,
    session: SessionState,
) -> PromptPair {
    let hints = session.hints.normalize();
    let correct_steps = session.correct_step_history.normalize();
    let incorrect_steps = session.incorrect_step_history.normalize();

    let hint_statement = if hints.is_empty() {
        "You child did not use a hint for this problem.".to_string()
    } else {
        format!(
            "Your child did use a hint. Here are hints used delimited by ';': {}.",
            hints.join("; ")
        )
    };
    let correct_steps_statement = if correct_steps.is_empty() {
        "Your child has not taken a step in solve the problem.".to_string()
    } else {
        format!(
            "Your child has taken the following correct steps to solve the problem: {}.",
            correct_steps.join("; ")
        )
    };
    let incorrect_steps_statement = if incorrect_steps.is_empty() {
        "Your child has not made an error in solving the current step.".to_string()
    } else {
        format!(
            "Your child has taken the following wrong attempt to solve the current step: {}.",
            incorrect_steps.join("; ")
        )
    };
    let kc_statement = session
        .knowledge_components
        .iter()
        .map(|(kc, def)| format!("{kc}: {def}"))
        .collect::<Vec<_>>()
        .join("\n");

    let user_prompt = PROMPT_TEMPLATE
        .replace("{few-shot-examples}", few_shot_examples)
        .replace("{hint-statement}", &hint_statement)
        .replace("{correct-steps-statement}", &correct_steps_statement)
        .replace("{incorrect-steps-statement}", &incorrect_steps_statement)
        .replace("{next-steps}", &session.suggested_next_steps.join("\n"))
        .replace("{knowledge-components-statement}", &kc_statement)
        .replace("{problem}", &session.current_problem)
        .replace("{chat-history}", &session.chat_history.join("\n"));

    tracing::debug!(
        user_prompt = %user_prompt,
        "User prompt after formatting"
    );

    PromptPair {
        system_prompt: persona_statement.to_string(),
        user_prompt,
    }
}
