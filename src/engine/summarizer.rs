//! Periodic conversation summaries.

use crate::engine::ReasoningEngine;
use crate::llm::{ChatMessage, Generate, GenerationError};
use crate::prompts::{build_summary_prompt, SUMMARIZER_SYSTEM};

/// Turns included in one summary, and the summary cadence in turns.
pub const SUMMARY_WINDOW: usize = 6;

/// Weight passed to `promote_summary` for generated summaries.
pub const SUMMARY_WEIGHT: f64 = 0.7;

impl ReasoningEngine {
    /// Summarize the last [`SUMMARY_WINDOW`] turns into mid-term memory.
    ///
    /// Makes one generation call. A non-empty (trimmed) result is stored
    /// via `promote_summary` and returned.
    ///
    /// # Returns
    /// `Ok(None)` when there is no history or the model returned nothing.
    pub fn summarize_recent(
        &mut self,
        generate: &dyn Generate,
    ) -> Result<Option<String>, GenerationError> {
        if self.history.is_empty() {
            return Ok(None);
        }

        let skip = self.history.len().saturating_sub(SUMMARY_WINDOW);
        let prompt = build_summary_prompt(
            self.history
                .iter()
                .skip(skip)
                .map(|t| (t.user.as_str(), t.assistant.as_str())),
        );

        let summary = generate.generate(&[
            ChatMessage::system(SUMMARIZER_SYSTEM),
            ChatMessage::user(prompt),
        ])?;
        let summary = summary.trim();
        if summary.is_empty() {
            return Ok(None);
        }

        self.memory.promote_summary(summary, SUMMARY_WEIGHT);
        log::debug!("{}: stored summary ({} chars)", self.name, summary.chars().count());
        Ok(Some(summary.to_string()))
    }
}
