//! Deterministic fallbacks used when no model is configured.
//!
//! Each style answers from the last `user` message alone and never fails,
//! so a helper without a model still completes every turn (council,
//! draft, self-eval and summary calls included).

use serde::{Deserialize, Serialize};

use crate::llm::{last_user_content, ChatMessage, Generate, GenerationError};
use crate::utilities::string_utils::{simplify_whitespace, truncate_chars};

/// Words that switch on the master fallback's quantum hint.
pub const QUANTUM_TRIGGERS: &[&str] = &[
    "quantum",
    "spacetime",
    "tesseract",
    "dimension",
    "4d",
    "6d",
    "spin",
    "entangle",
    "superposition",
];

/// Which canned behaviour a [`FallbackBackend`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackStyle {
    /// Short acknowledgement echoing the request.
    Scriptor,
    /// Layered reasoning outline with an optional quantum hint.
    Master,
    /// Very short, speed-first reply.
    Micro,
    /// Structural re-indentation of code.
    Patcher,
    /// Symbolic four-voice council.
    MultiModel,
    /// Whitespace simplification.
    Rewriter,
}

/// A [`Generate`] implementation that never calls a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackBackend {
    style: FallbackStyle,
}

impl FallbackBackend {
    pub fn new(style: FallbackStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> FallbackStyle {
        self.style
    }

    /// Render the canned answer for `user_text`.
    pub fn respond(&self, user_text: &str) -> String {
        match self.style {
            FallbackStyle::Scriptor => scriptor(user_text),
            FallbackStyle::Master => master(user_text),
            FallbackStyle::Micro => micro(user_text),
            FallbackStyle::Patcher => patcher(user_text),
            FallbackStyle::MultiModel => symbolic_fusion(user_text),
            FallbackStyle::Rewriter => rewriter(user_text),
        }
    }
}

impl Generate for FallbackBackend {
    fn generate(&self, messages: &[ChatMessage]) -> Result<String, GenerationError> {
        Ok(self.respond(last_user_content(messages)))
    }
}

fn scriptor(user_text: &str) -> String {
    format!("[Fallback Scriptor] Received: {} ...", truncate_chars(user_text, 240))
}

/// Extra framing for "deep structure" questions; empty otherwise.
pub fn quantum_hint(prompt: &str) -> &'static str {
    let lower = prompt.to_lowercase();
    if QUANTUM_TRIGGERS.iter().any(|t| lower.contains(t)) {
        "\n[Quantum-Assist Node Activated]\n\
         Internal simulation: applying reversible logic gates, \
         state vector rotation, and 4D cognitive compression.\n"
    } else {
        ""
    }
}

fn master(user_text: &str) -> String {
    format!(
        "[Fallback Master Brain]\n\
         {hint}\
         Reasoning layers:\n \
         - Logical baseline: interpreting your request.\n \
         - Empathic check: emotional context evaluated.\n \
         - Creative synthesis: generating solutions.\n \
         - Memory resonance: aligning with past items.\n\n\
         User Prompt: {prompt}...\n\
         Provisional Answer: The Helper Master Brain would respond \
         with a deeply layered, multi-dimensional analysis here.",
        hint = quantum_hint(user_text),
        prompt = truncate_chars(user_text, 300),
    )
}

fn micro(user_text: &str) -> String {
    format!(
        "[Micro Brain]\n\
         Ultra-light inference active.\n\
         User prompt: {}...\n\
         Response: I processed your message with compact reasoning. \
         This mode prioritizes speed over depth.",
        truncate_chars(user_text, 200)
    )
}

/// Re-indent code by block structure.
///
/// Lines ending in `:` open a block; a line starting with `return`, `pass`
/// or `break` is the last line of its block. Every line is stripped and
/// re-indented with four spaces per level.
pub fn stabilize_indentation(code: &str) -> String {
    let mut indent = 0usize;
    let mut fixed = Vec::new();
    for line in code.trim().lines() {
        let s = line.trim();
        if s.ends_with(':') {
            fixed.push(format!("{}{}", "    ".repeat(indent), s));
            indent += 1;
            continue;
        }
        fixed.push(format!("{}{}", "    ".repeat(indent), s));
        if s.starts_with("return") || s.starts_with("pass") || s.starts_with("break") {
            indent = indent.saturating_sub(1);
        }
    }
    fixed.join("\n")
}

fn patcher(user_text: &str) -> String {
    format!(
        "[Fallback Patcher Brain]\n\
         No model configured; applying structural stabilization.\n\n{}",
        stabilize_indentation(user_text)
    )
}

/// Symbolic four-voice council used when no fusion models are configured.
pub fn symbolic_fusion(user_text: &str) -> String {
    format!(
        r#"[MultiModel Fallback Fusion]

No fusion models configured. Using symbolic inner council:

[Model-A: LOGICIAN]
- Focus on correctness, structure, and clarity.
- Ensures reasoning chains are stepwise and justified.

[Model-B: CREATOR]
- Focus on ideas, analogies, and lateral thinking.
- Suggests alternate angles and improvements.

[Model-C: EMPATH]
- Focus on tone, emotional safety, and user support.

[Model-D: CRITIC]
- Points out risks, inconsistencies, and missing pieces.

User request:
"""{}"""

Fusion Answer (conceptual):
- A balanced response combining logical precision, creativity,
  empathy, and critical checking would be produced here.
- To get real multimodel fusion, list sibling models under
  models.helpers.multimodel in the lab config.
"#,
        truncate_chars(user_text, 600)
    )
}

fn rewriter(user_text: &str) -> String {
    format!(
        "[Rewriter Fallback]\n\
         No model configured. Performing simplification:\n\n\
         === Rewritten Text ===\n{}",
        simplify_whitespace(user_text)
    )
}
