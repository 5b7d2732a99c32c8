//! The reasoning engine.
//!
//! One [`ReasoningEngine`] owns a [`StateVector`], a [`MemoryStore`] and a
//! rolling dialog history. [`ReasoningEngine::generate_reply`] runs one turn:
//!
//! ```text
//! BUILD_CONTEXT -> [council] -> DRAFT -> [self-eval] -> FINALIZE
//!   -> STATE_UPDATE -> MEMORY_WRITE -> [SUMMARIZE every 6th turn]
//! ```
//!
//! The generation backend is passed in per call. Errors from the council,
//! draft and self-eval calls propagate to the caller; memory and
//! summarization failures never fail a turn.

pub mod heuristics;
pub mod summarizer;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm::{ChatMessage, Generate, GenerationError};
use crate::memory::{MemoryRole, MemoryStore};
use crate::memory::store::DEFAULT_RECALL_CHARS;
use crate::prompts::{
    build_internal_notes, build_multi_agent_prompt, build_self_eval_prompt, build_system_prompt,
    extract_final_answer, recursive_refine, COUNCIL_SYSTEM, COUNCIL_TRACE_TAG, SELF_EVAL_SYSTEM,
};
use crate::state::StateVector;

use self::heuristics::{importance_for, update_state, ASSISTANT_IMPORTANCE_RATIO, HIGH_IMPORTANCE};
use self::summarizer::SUMMARY_WINDOW;

/// Default assistant name.
pub const DEFAULT_ENGINE_NAME: &str = "RomanAI";

/// Capacity of the rolling dialog history.
pub const DIALOG_HISTORY_CAPACITY: usize = 64;

/// Depth of the recursive-refine framing.
pub const REFINE_DEPTH: usize = 2;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Optional passes of a turn. All on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Add recursive-refine framing to the private notes.
    pub recursive: bool,
    /// Run the inner-council generation pass.
    pub multi_agent: bool,
    /// Run the self-evaluation generation pass.
    pub self_eval: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            multi_agent: true,
            self_eval: true,
        }
    }
}

/// One completed exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogTurn {
    pub user: String,
    pub assistant: String,
}

// ---------------------------------------------------------------------------
// ReasoningEngine
// ---------------------------------------------------------------------------

/// Stateful turn orchestrator.
#[derive(Debug)]
pub struct ReasoningEngine {
    name: String,
    state: StateVector,
    memory: MemoryStore,
    options: EngineOptions,
    history: VecDeque<DialogTurn>,
    turns: u64,
}

impl ReasoningEngine {
    /// Create an engine named `name` over `memory`, with default state and options.
    pub fn new(name: impl Into<String>, memory: MemoryStore) -> Self {
        Self {
            name: name.into(),
            state: StateVector::default(),
            memory,
            options: EngineOptions::default(),
            history: VecDeque::with_capacity(DIALOG_HISTORY_CAPACITY),
            turns: 0,
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_recursive(mut self, enabled: bool) -> Self {
        self.options.recursive = enabled;
        self
    }

    pub fn with_multi_agent(mut self, enabled: bool) -> Self {
        self.options.multi_agent = enabled;
        self
    }

    pub fn with_self_eval(mut self, enabled: bool) -> Self {
        self.options.self_eval = enabled;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &StateVector {
        &self.state
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Rolling history, oldest first.
    pub fn dialog_history(&self) -> impl Iterator<Item = &DialogTurn> {
        self.history.iter()
    }

    /// Completed turns since construction.
    pub fn turn_count(&self) -> u64 {
        self.turns
    }

    /// The system prompt the next turn would start from.
    pub fn system_prompt(&self) -> String {
        let recall = self.memory.recall_snippet(DEFAULT_RECALL_CHARS);
        build_system_prompt(&self.name, &self.state, &recall)
    }

    /// Current recall snippet.
    pub fn recall_memory(&self) -> String {
        self.memory.recall_snippet(DEFAULT_RECALL_CHARS)
    }

    /// Store a fact supplied from outside a conversation.
    ///
    /// Blank text is ignored. Anything else is stored as a `user` entry at
    /// long-term importance.
    ///
    /// # Returns
    /// Whether something was stored.
    pub fn store_memory(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.memory.add(MemoryRole::User, text, HIGH_IMPORTANCE);
        true
    }

    /// Run one full turn and return the final answer.
    ///
    /// # Arguments
    /// * `user_text` - The user's message.
    /// * `generate` - Backend used for every generation call of this turn.
    ///
    /// # Errors
    /// Any error from the council, draft or self-eval call. State, history
    /// and memory are left untouched when the turn fails.
    pub fn generate_reply(
        &mut self,
        user_text: &str,
        generate: &dyn Generate,
    ) -> Result<String, GenerationError> {
        let turn_id = Uuid::new_v4();
        log::debug!("{} turn {}: {} chars in", self.name, turn_id, user_text.chars().count());

        let mut messages = vec![
            ChatMessage::system(self.system_prompt()),
            ChatMessage::user(user_text),
        ];

        let mut traces: Vec<String> = Vec::new();
        if self.options.recursive {
            traces.extend(recursive_refine(user_text, REFINE_DEPTH));
        }

        if self.options.multi_agent {
            let council = generate.generate(&[
                ChatMessage::system(COUNCIL_SYSTEM),
                ChatMessage::user(build_multi_agent_prompt(user_text)),
            ])?;
            traces.push(format!("{COUNCIL_TRACE_TAG}\n{council}"));
        }

        if !traces.is_empty() {
            messages.push(ChatMessage::system(build_internal_notes(&traces)));
        }
        messages.push(ChatMessage::user(user_text));

        let draft = generate.generate(&messages)?.trim().to_string();
        let mut final_answer = draft.clone();

        if self.options.self_eval {
            let eval = generate.generate(&[
                ChatMessage::system(SELF_EVAL_SYSTEM),
                ChatMessage::user(build_self_eval_prompt(&draft, user_text)),
            ])?;
            match extract_final_answer(&eval) {
                Some(improved) => final_answer = improved,
                None => log::debug!("{} turn {}: no final marker, keeping draft", self.name, turn_id),
            }
        }

        update_state(&mut self.state, user_text, &final_answer);
        self.push_history(user_text, &final_answer);

        let importance = importance_for(user_text);
        self.memory.add(MemoryRole::User, user_text, importance);
        self.memory
            .add(MemoryRole::Assistant, final_answer.as_str(), importance * ASSISTANT_IMPORTANCE_RATIO);

        if self.history.len() % SUMMARY_WINDOW == 0 {
            if let Err(e) = self.summarize_recent(generate) {
                log::warn!("{} turn {}: summarization skipped: {}", self.name, turn_id, e);
            }
        }

        self.turns += 1;
        log::debug!(
            "{} turn {}: {} chars out, {}",
            self.name,
            turn_id,
            final_answer.chars().count(),
            self.state
        );
        Ok(final_answer)
    }

    fn push_history(&mut self, user: &str, assistant: &str) {
        if self.history.len() >= DIALOG_HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(DialogTurn {
            user: user.to_string(),
            assistant: assistant.to_string(),
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{last_user_content, Role};
    use crate::memory::{InMemoryLog, Tier};
    use crate::prompts::SUMMARIZER_SYSTEM;
    use parking_lot::Mutex;

    /// Records every call and answers according to the system message.
    struct Scripted {
        calls: Mutex<Vec<Vec<ChatMessage>>>,
        self_eval: String,
        summary: Result<String, String>,
    }

    impl Scripted {
        fn new(self_eval: &str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                self_eval: self_eval.to_string(),
                summary: Ok("- summary".to_string()),
            }
        }

        fn calls_with_system(&self, system: &str) -> usize {
            self.calls
                .lock()
                .iter()
                .filter(|m| m[0].role == Role::System && m[0].content == system)
                .count()
        }
    }

    impl Generate for Scripted {
        fn generate(&self, messages: &[ChatMessage]) -> Result<String, GenerationError> {
            self.calls.lock().push(messages.to_vec());
            match messages[0].content.as_str() {
                COUNCIL_SYSTEM => Ok("council notes ROMANAI_SUMMARY: be kind".to_string()),
                SELF_EVAL_SYSTEM => Ok(self.self_eval.clone()),
                SUMMARIZER_SYSTEM => self.summary.clone().map_err(GenerationError::backend),
                _ => Ok(format!("  echo: {}  ", last_user_content(messages))),
            }
        }
    }

    fn engine() -> ReasoningEngine {
        ReasoningEngine::new("RomanAI", MemoryStore::ephemeral())
    }

    #[test]
    fn test_turn_message_layout() {
        let gen = Scripted::new("no marker");
        let mut engine = engine();
        engine.generate_reply("hello", &gen).unwrap();

        let calls = gen.calls.lock();
        assert_eq!(calls.len(), 3);

        // Council pass.
        assert_eq!(calls[0][0].content, COUNCIL_SYSTEM);
        assert!(calls[0][1].content.contains("\"\"\"hello\"\"\""));

        // Draft pass: system, user, notes, user again.
        let draft = &calls[1];
        assert_eq!(draft.len(), 4);
        assert!(draft[0].content.starts_with("You are RomanAI,"));
        assert_eq!(draft[1], ChatMessage::user("hello"));
        assert_eq!(draft[2].role, Role::System);
        assert!(draft[2].content.contains("Initial thought: hello"));
        assert!(draft[2].content.contains("Refine (pass 2): Refine (pass 1): hello"));
        assert!(draft[2].content.contains("[COUNCIL]\ncouncil notes"));
        assert_eq!(draft[3], ChatMessage::user("hello"));

        // Self-eval sees the trimmed draft.
        assert!(calls[2][1].content.contains("\"\"\"echo: hello\"\"\""));
    }

    #[test]
    fn test_self_eval_marker_replaces_draft() {
        let gen = Scripted::new("...blah ROMANAI_FINAL: improved text");
        let mut engine = engine();
        assert_eq!(engine.generate_reply("q", &gen).unwrap(), "improved text");
    }

    #[test]
    fn test_draft_kept_without_marker() {
        let gen = Scripted::new("strengths: fine");
        let mut engine = engine();
        assert_eq!(engine.generate_reply("q", &gen).unwrap(), "echo: q");
    }

    #[test]
    fn test_all_passes_disabled_makes_one_call() {
        let gen = Scripted::new("ROMANAI_FINAL: unused");
        let mut engine = engine()
            .with_recursive(false)
            .with_multi_agent(false)
            .with_self_eval(false);
        assert_eq!(engine.generate_reply("q", &gen).unwrap(), "echo: q");
        let calls = gen.calls.lock();
        assert_eq!(calls.len(), 1);
        // No notes message; the user message is still repeated.
        assert_eq!(calls[0].len(), 3);
        assert_eq!(calls[0][2], ChatMessage::user("q"));
    }

    #[test]
    fn test_sad_lonely_scenario() {
        let echo = |messages: &[ChatMessage]| -> Result<String, GenerationError> {
            Ok(last_user_content(messages).to_string())
        };
        let log = InMemoryLog::new();
        let mut engine = ReasoningEngine::new("RomanAI", MemoryStore::with_log(Box::new(log.clone())));
        let before = engine.state().empathy;

        engine.generate_reply("I feel so sad and lonely today", &echo).unwrap();

        let after = engine.state().empathy;
        assert!(after > before);
        let boosted = (before + 0.08).min(1.0);
        let expected = boosted + (0.55 - boosted) * 0.02;
        assert!((after - expected).abs() < 1e-12);

        let entries = log.entries();
        let user = &entries[0];
        assert_eq!(user.role, MemoryRole::User);
        assert_eq!(user.content, "I feel so sad and lonely today");
        assert_eq!(user.importance, 0.4);
        assert_eq!(user.tier(), Tier::ShortTerm);
        assert_eq!(entries[1].role, MemoryRole::Assistant);
        assert!((entries[1].importance - 0.32).abs() < 1e-12);
    }

    #[test]
    fn test_important_message_goes_long_term() {
        let gen = Scripted::new("x");
        let mut engine = engine();
        engine.generate_reply("Remember: my birthday is in May", &gen).unwrap();
        let long: Vec<_> = engine.memory().long_term().iter().map(|e| e.role).collect();
        // User at 0.8 and assistant at 0.64: only the user entry is long-term.
        assert_eq!(long, vec![MemoryRole::User]);
    }

    #[test]
    fn test_six_turns_trigger_one_summary() {
        let gen = Scripted::new("x");
        let mut engine = engine();
        for i in 0..5 {
            engine.generate_reply(&format!("turn {i}"), &gen).unwrap();
        }
        assert_eq!(gen.calls_with_system(SUMMARIZER_SYSTEM), 0);
        assert_eq!(engine.memory().mid_term().count(), 0);

        engine.generate_reply("turn 5", &gen).unwrap();
        assert_eq!(gen.calls_with_system(SUMMARIZER_SYSTEM), 1);
        let mids: Vec<_> = engine.memory().mid_term().collect();
        assert_eq!(mids.len(), 1);
        assert_eq!(mids[0].role, MemoryRole::Summary);
        assert_eq!(mids[0].content, "- summary");
        assert_eq!(mids[0].importance, 0.7);

        let summary_call = gen
            .calls
            .lock()
            .iter()
            .find(|m| m[0].content == SUMMARIZER_SYSTEM)
            .cloned()
            .unwrap();
        assert!(summary_call[1].content.contains("User: turn 0\nRomanAI: echo: turn 0"));
        assert!(summary_call[1].content.contains("User: turn 5\nRomanAI: echo: turn 5"));
    }

    #[test]
    fn test_summary_failure_does_not_fail_turn() {
        let mut gen = Scripted::new("x");
        gen.summary = Err("summarizer down".to_string());
        let mut engine = engine();
        for i in 0..6 {
            assert!(engine.generate_reply(&format!("t{i}"), &gen).is_ok());
        }
        assert_eq!(engine.memory().mid_term().count(), 0);
        assert_eq!(engine.turn_count(), 6);
    }

    #[test]
    fn test_empty_summary_is_not_stored() {
        let mut gen = Scripted::new("x");
        gen.summary = Ok("   ".to_string());
        let mut engine = engine();
        for i in 0..6 {
            engine.generate_reply(&format!("t{i}"), &gen).unwrap();
        }
        assert_eq!(engine.memory().mid_term().count(), 0);
    }

    #[test]
    fn test_generation_failure_propagates_and_leaves_engine_untouched() {
        let failing = |messages: &[ChatMessage]| -> Result<String, GenerationError> {
            if messages[0].content == COUNCIL_SYSTEM {
                Err(GenerationError::backend("council offline"))
            } else {
                Ok("fine".to_string())
            }
        };
        let mut engine = engine();
        let before = *engine.state();
        let err = engine.generate_reply("hi", &failing).unwrap_err();
        assert!(err.to_string().contains("council offline"));
        assert_eq!(*engine.state(), before);
        assert!(engine.memory().is_empty());
        assert_eq!(engine.dialog_history().count(), 0);
    }

    #[test]
    fn test_history_is_bounded() {
        let echo = |_: &[ChatMessage]| -> Result<String, GenerationError> { Ok("ok".into()) };
        let mut engine = engine()
            .with_multi_agent(false)
            .with_self_eval(false);
        for i in 0..70 {
            engine.generate_reply(&format!("m{i}"), &echo).unwrap();
        }
        let history: Vec<_> = engine.dialog_history().collect();
        assert_eq!(history.len(), DIALOG_HISTORY_CAPACITY);
        assert_eq!(history[0].user, "m6");
    }

    #[test]
    fn test_store_and_recall_memory() {
        let mut engine = engine();
        assert!(!engine.store_memory("   "));
        assert!(engine.store_memory("the launch code is blue"));
        assert_eq!(engine.recall_memory(), "[LONG] the launch code is blue");
        assert!(engine.system_prompt().contains("[LONG] the launch code is blue"));
    }
}
