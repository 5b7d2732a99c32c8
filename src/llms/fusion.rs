//! Multi-model fusion.
//!
//! Every sibling model answers the same conversation; the first sibling
//! then merges those answers into one. With no siblings configured the
//! symbolic council fallback answers instead.

use crate::llm::{last_user_content, ChatMessage, Generate, GenerationError};
use crate::llms::fallback::symbolic_fusion;

/// System message for the merge call.
pub const FUSION_SYSTEM: &str = "You are RomanAI Fusion Node.";

/// A labelled sibling model.
pub struct Sibling {
    pub label: String,
    pub backend: Box<dyn Generate>,
}

impl Sibling {
    pub fn new(label: impl Into<String>, backend: Box<dyn Generate>) -> Self {
        Self {
            label: label.into(),
            backend,
        }
    }
}

/// Fan-out-and-merge backend.
///
/// Sibling failures are folded into the merge input as `[label ERROR: ...]`;
/// a failed merge falls back to concatenating the sibling answers. The
/// backend therefore never returns an error.
#[derive(Default)]
pub struct FusionBackend {
    siblings: Vec<Sibling>,
}

impl FusionBackend {
    pub fn new(siblings: Vec<Sibling>) -> Self {
        Self { siblings }
    }

    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    fn collect(&self, messages: &[ChatMessage]) -> Vec<(&str, String)> {
        self.siblings
            .iter()
            .map(|s| {
                let answer = s
                    .backend
                    .generate(messages)
                    .unwrap_or_else(|e| format!("[{} ERROR: {}]", s.label, e));
                (s.label.as_str(), answer)
            })
            .collect()
    }
}

/// Merge request over the sibling answers.
pub fn build_fusion_prompt(user_text: &str, answers: &[(&str, String)]) -> String {
    let mut prompt = String::from("You are RomanAI Fusion Node.\n\n");
    prompt.push_str(
        "You received answers from multiple sibling models. \
         Your job is to synthesize their perspectives into ONE clear, helpful answer.\n\n",
    );
    prompt.push_str(&format!("User request:\n\"\"\"{user_text}\"\"\"\n\n"));
    prompt.push_str("Sibling model answers:\n");
    for (label, answer) in answers {
        prompt.push_str(&format!("\n[{label}]:\n{answer}\n"));
    }
    prompt.push_str(
        "\nNow produce a single fused answer that:\n\
         - chooses the best reasoning from each model\n\
         - resolves contradictions\n\
         - stays concise but not shallow\n\
         - is directly addressed to the user\n\
         - DOES NOT mention the existence of multiple models\n",
    );
    prompt
}

impl Generate for FusionBackend {
    fn generate(&self, messages: &[ChatMessage]) -> Result<String, GenerationError> {
        let user_text = last_user_content(messages);
        let Some(first) = self.siblings.first() else {
            return Ok(symbolic_fusion(user_text));
        };

        let answers = self.collect(messages);
        let merge = [
            ChatMessage::system(FUSION_SYSTEM),
            ChatMessage::user(build_fusion_prompt(user_text, &answers)),
        ];
        match first.backend.generate(&merge) {
            Ok(fused) => Ok(fused),
            Err(e) => {
                log::warn!("fusion merge via {} failed: {}", first.label, e);
                let mut text = String::from("[Fusion Fallback]\n");
                for (label, answer) in &answers {
                    text.push_str(&format!("\n[{label}]\n{answer}\n"));
                }
                text.push_str(&format!("\n[Fusion error while summarizing: {e}]"));
                Ok(text)
            }
        }
    }
}
