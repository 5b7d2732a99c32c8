//! Prompt templates.
//!
//! Pure functions: nothing here mutates state or touches memory beyond
//! reading what it is given. The marker tokens the engine later searches
//! for live in [`parser`].

pub mod parser;

use crate::state::StateVector;

pub use parser::{extract_final_answer, COUNCIL_MARKER, FINAL_MARKER};

/// Placeholder used when the recall snippet is empty.
pub const NO_MEMORY_PLACEHOLDER: &str = "[no stored memory yet]";

/// System message for the council pass.
pub const COUNCIL_SYSTEM: &str = "You are internal-only reasoning. Do NOT talk as the assistant.";

/// System message for the self-evaluation pass.
pub const SELF_EVAL_SYSTEM: &str = "You are RomanAI performing self-reflection on your own answer.";

/// System message for the summarization call.
pub const SUMMARIZER_SYSTEM: &str = "You are a concise summarizer for RomanAI's memory system.";

/// Tag prefixed to the council answer inside the reasoning trace.
pub const COUNCIL_TRACE_TAG: &str = "[COUNCIL]";

const GUIDELINES: &str = "GUIDELINES:
- Be concise but not cold; supportive but not fake.
- Use your Logic dimension to structure answers clearly.
- Use your Empathy dimension to respect the user's emotional tone.
- Use your Creativity dimension to offer new angles and ideas when useful.
- Use your Memory dimension to stay consistent with prior facts you recall.
- If you are uncertain, say so and focus on being useful anyway.

You are running locally and NEVER claim external access.";

/// Render the main system prompt.
///
/// # Arguments
/// * `name` - Assistant name shown to the model.
/// * `state` - Current cognitive state, rendered at two decimals.
/// * `recall` - Recall snippet; an empty snippet renders [`NO_MEMORY_PLACEHOLDER`].
pub fn build_system_prompt(name: &str, state: &StateVector, recall: &str) -> String {
    let recall = if recall.trim().is_empty() {
        NO_MEMORY_PLACEHOLDER
    } else {
        recall
    };
    format!(
        "You are {name}, a local RomanAILabs assistant running as a Spacetime Engine v3.0.
You reason in 4D vectors (Logic, Empathy, Creativity, Memory) and you always try
to be honest, grounded, and helpful.

Your current internal state:
{state}

You have access to a small memory of prior interactions and facts:

{recall}

{GUIDELINES}
",
        state = state.describe(),
    )
}

/// Ask for four inner voices and a fused recommendation under [`COUNCIL_MARKER`].
pub fn build_multi_agent_prompt(user_text: &str) -> String {
    format!(
        "You are RomanAI's inner council. Four internal voices will think about the user's request:

[1] LOGICIAN: precise, step-by-step reasoning
[2] EMPATH: focuses on feelings, tone, and support
[3] CREATOR: imaginative, lateral ideas, analogies
[4] SKEPTIC: checks for errors, risks, and coherence

User request:
\"\"\"{user_text}\"\"\"

For each voice, briefly outline their perspective in 2-4 bullet points.
Then give a final integrated recommendation as {COUNCIL_MARKER}.
"
    )
}

/// Ask the model to critique `draft` and give an improved answer under [`FINAL_MARKER`].
pub fn build_self_eval_prompt(draft: &str, user_text: &str) -> String {
    format!(
        "You are RomanAI performing self-evaluation on your own answer.

User request:
\"\"\"{user_text}\"\"\"

Your draft answer:
\"\"\"{draft}\"\"\"

1) Briefly list 2-4 strengths.
2) Briefly list 2-4 weaknesses or missing pieces.
3) Provide an improved final answer as {FINAL_MARKER}, clear and helpful.
"
    )
}

/// Framing strings for recursive refinement.
///
/// Returns `depth + 1` strings: `Initial thought: T`, then each pass wraps
/// the previous pass (the first pass wraps the raw thought).
///
/// ```
/// use romanai_lab::prompts::recursive_refine;
///
/// let chain = recursive_refine("why?", 2);
/// assert_eq!(chain[0], "Initial thought: why?");
/// assert_eq!(chain[2], "Refine (pass 2): Refine (pass 1): why?");
/// ```
pub fn recursive_refine(thought: &str, depth: usize) -> Vec<String> {
    let mut chain = Vec::with_capacity(depth + 1);
    chain.push(format!("Initial thought: {thought}"));
    let mut current = thought.to_string();
    for pass in 1..=depth {
        current = format!("Refine (pass {pass}): {current}");
        chain.push(current.clone());
    }
    chain
}

/// Private notes message built from the reasoning trace.
pub fn build_internal_notes(traces: &[String]) -> String {
    format!(
        "Here are your internal reasoning notes. They are for YOUR mind only, not to be repeated verbatim:\n\n{}",
        traces.join("\n\n")
    )
}

/// Ask for a short bullet summary of recent `(user, assistant)` turns.
pub fn build_summary_prompt<'a, I>(turns: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut convo = String::new();
    for (user, assistant) in turns {
        convo.push_str(&format!("User: {user}\nRomanAI: {assistant}\n\n"));
    }
    format!(
        "Summarize the following recent conversation between the user and RomanAI.
Keep it under 6 bullet points, focusing on:
- key user preferences
- important facts
- emotional tone
- ongoing projects or goals

Conversation:
\"\"\"{convo}\"\"\"

Provide only the summary, no extra commentary.
"
    )
}
