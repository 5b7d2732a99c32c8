//! Helper backends.
//!
//! A [`Helper`] is a named [`ReasoningEngine`] paired with its own
//! generation backend. Six kinds exist; each has a router key, a display
//! label, default sampling for its model and, for the patcher and the
//! rewriter, a fixed instruction wrapper around the user's prompt.

pub mod router;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::engine::{EngineOptions, ReasoningEngine};
use crate::llm::{Generate, GenerationError};
use crate::llms::{
    FallbackBackend, FallbackStyle, FusionBackend, LocalModelBackend, ModelEndpoint,
    ModelOrFallback, Sibling,
};
use crate::memory::MemoryStore;
use crate::utilities::string_utils::clean_markdown;

pub use router::HelperRouter;

// ---------------------------------------------------------------------------
// HelperKind
// ---------------------------------------------------------------------------

/// The six helper backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HelperKind {
    Scriptor,
    Master,
    Micro,
    Patcher,
    #[serde(rename = "multimodel")]
    MultiModel,
    Rewriter,
}

impl HelperKind {
    pub const ALL: [HelperKind; 6] = [
        HelperKind::Scriptor,
        HelperKind::Master,
        HelperKind::Micro,
        HelperKind::Patcher,
        HelperKind::MultiModel,
        HelperKind::Rewriter,
    ];

    /// Router key.
    pub fn key(&self) -> &'static str {
        match self {
            HelperKind::Scriptor => "scriptor",
            HelperKind::Master => "master",
            HelperKind::Micro => "micro",
            HelperKind::Patcher => "patcher",
            HelperKind::MultiModel => "multimodel",
            HelperKind::Rewriter => "rewriter",
        }
    }

    /// Case-insensitive lookup by router key.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase();
        Self::ALL.into_iter().find(|k| k.key() == key)
    }

    /// Short display label, as used in `[<Label> backend missing]`.
    pub fn label(&self) -> &'static str {
        match self {
            HelperKind::Scriptor => "Scriptor",
            HelperKind::Master => "Master",
            HelperKind::Micro => "Micro",
            HelperKind::Patcher => "Patcher",
            HelperKind::MultiModel => "MultiModel",
            HelperKind::Rewriter => "Rewriter",
        }
    }

    /// Name given to the helper's engine.
    pub fn engine_name(&self) -> &'static str {
        match self {
            HelperKind::Scriptor => "Helper Scriptor",
            HelperKind::Master => "Helper Master",
            HelperKind::Micro => "Helper Micro",
            HelperKind::Patcher => "Helper Patcher",
            HelperKind::MultiModel => "Helper MultiModel",
            HelperKind::Rewriter => "Tool Rewriter",
        }
    }

    /// Tag used when rendering a failed turn.
    pub fn error_tag(&self) -> String {
        match self {
            HelperKind::Rewriter => "tool_rewriter".to_string(),
            other => format!("helper_{}", other.key()),
        }
    }

    /// Default `(max_tokens, temperature)` for the helper's model.
    pub fn sampling(&self) -> (u32, f64) {
        match self {
            HelperKind::Scriptor => (2048, 0.4),
            HelperKind::Master => (2048, 0.7),
            HelperKind::Micro => (512, 0.4),
            HelperKind::Patcher => (4096, 0.1),
            HelperKind::MultiModel => (1024, 0.6),
            HelperKind::Rewriter => (2048, 0.6),
        }
    }

    pub fn fallback_style(&self) -> FallbackStyle {
        match self {
            HelperKind::Scriptor => FallbackStyle::Scriptor,
            HelperKind::Master => FallbackStyle::Master,
            HelperKind::Micro => FallbackStyle::Micro,
            HelperKind::Patcher => FallbackStyle::Patcher,
            HelperKind::MultiModel => FallbackStyle::MultiModel,
            HelperKind::Rewriter => FallbackStyle::Rewriter,
        }
    }

    /// Text actually handed to the engine for `prompt`.
    pub fn prepare_prompt(&self, prompt: &str) -> String {
        match self {
            HelperKind::Patcher => format!(
                "You are RomanAI Autopatcher (Helper Mode).\n\
                 Your job: Repair the following code while changing as little as possible.\n\
                 Fix:\n \
                 - syntax errors\n \
                 - indentation errors\n \
                 - missing symbols (:, (), [], {{}})\n \
                 - logical blockers\n \
                 - keep original structure\n \
                 - NEVER output explanations\n \
                 - ALWAYS output only the patched code\n\n\
                 === CODE TO PATCH ===\n\
                 {prompt}\n\
                 === END CODE ==="
            ),
            HelperKind::Rewriter => format!(
                "You are RomanAI Rewriter Tool.\n\
                 Rewrite, polish, or restructure the following text/code.\n\
                 Preserve meaning and accuracy.\n\
                 Improve clarity, structure, and flow.\n\
                 Do NOT hallucinate.\n\n\
                 CONTENT:\n\
                 {prompt}\n\
                 === END CONTENT ==="
            ),
            _ => prompt.to_string(),
        }
    }

    /// Post-process the engine's answer.
    pub fn finish_answer(&self, answer: String) -> String {
        match self {
            HelperKind::Patcher | HelperKind::Rewriter => clean_markdown(&answer),
            _ => answer,
        }
    }

    /// Build the generation backend for this kind from its configured models.
    ///
    /// The multimodel helper fuses every listed model (labelled `Model-A`,
    /// `Model-B`, ...). Every other kind uses the first model, or its
    /// fallback when the list is empty. Unset sampling fields are filled
    /// from [`HelperKind::sampling`].
    pub fn backend(&self, models: &[ModelEndpoint]) -> Box<dyn Generate> {
        let (max_tokens, temperature) = self.sampling();
        let local = |endpoint: &ModelEndpoint| -> Box<dyn Generate> {
            Box::new(LocalModelBackend::new(
                endpoint.clone().or_sampling(max_tokens, temperature),
            ))
        };

        match self {
            HelperKind::MultiModel => Box::new(FusionBackend::new(
                models
                    .iter()
                    .enumerate()
                    .map(|(i, m)| Sibling::new(sibling_label(i), local(m)))
                    .collect(),
            )),
            kind => Box::new(ModelOrFallback::new(
                kind.label(),
                models.first().map(local),
                FallbackBackend::new(kind.fallback_style()),
            )),
        }
    }
}

impl std::fmt::Display for HelperKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

fn sibling_label(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => format!("Model-{}", char::from(b'A' + i)),
        _ => format!("Model-{}", index + 1),
    }
}

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

/// One helper: an engine behind a lock plus the backend it generates with.
///
/// Concurrent callers of the same helper are serialized by the lock.
pub struct Helper {
    kind: HelperKind,
    engine: Mutex<ReasoningEngine>,
    backend: Box<dyn Generate>,
}

impl Helper {
    pub fn new(kind: HelperKind, memory: MemoryStore, backend: Box<dyn Generate>) -> Self {
        Self {
            kind,
            engine: Mutex::new(ReasoningEngine::new(kind.engine_name(), memory)),
            backend,
        }
    }

    /// Helper over `memory` using the models configured for `kind`.
    pub fn from_models(kind: HelperKind, models: &[ModelEndpoint], memory: MemoryStore) -> Self {
        Self::new(kind, memory, kind.backend(models))
    }

    /// Replace the engine's turn options.
    pub fn with_options(self, options: EngineOptions) -> Self {
        Self {
            engine: Mutex::new(self.engine.into_inner().with_options(options)),
            ..self
        }
    }

    pub fn kind(&self) -> HelperKind {
        self.kind
    }

    /// Run one engine turn, propagating generation errors.
    pub fn try_run(&self, prompt: &str) -> Result<String, GenerationError> {
        let prepared = self.kind.prepare_prompt(prompt);
        let answer = self
            .engine
            .lock()
            .generate_reply(&prepared, self.backend.as_ref())?;
        Ok(self.kind.finish_answer(answer))
    }

    /// Run one engine turn; failures come back as `[<tag> ERROR: ...]`.
    pub fn run(&self, prompt: &str) -> String {
        self.try_run(prompt).unwrap_or_else(|e| {
            log::warn!("{} turn failed: {}", self.kind.engine_name(), e);
            format!("[{} ERROR: {}]", self.kind.error_tag(), e)
        })
    }

    pub fn recall_memory(&self) -> String {
        self.engine.lock().recall_memory()
    }

    pub fn store_memory(&self, text: &str) -> bool {
        self.engine.lock().store_memory(text)
    }
}

impl std::fmt::Debug for Helper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Helper").field("kind", &self.kind).finish_non_exhaustive()
    }
}
