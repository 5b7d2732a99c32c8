//! Two-sided lab session.
//!
//! The lab has a *scriptor* side (coding) and a *master* side (reasoning).
//! Each side picks a backend by display name: its own direct model, or one
//! of the helpers. [`LabSession::send`] runs a turn on a worker thread, at
//! most one per side at a time.

pub mod gate;
pub mod transcript;

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::{LabConfig, MASTER_MODEL_BACKEND, SCRIPTOR_MODEL_BACKEND};
use crate::helpers::{HelperKind, HelperRouter};
use crate::llm::{ChatMessage, Generate};
use crate::llms::LocalModelBackend;
use crate::utilities::string_utils::clean_markdown;

pub use gate::{TurnGate, TurnGuard};
pub use transcript::TranscriptLog;

/// Notice shown when a side already has a turn in flight.
pub const STILL_THINKING: &str = "RomanAI: Still thinking...";

/// Sampling for direct-model turns.
pub const DIRECT_MAX_TOKENS: u32 = 2048;
pub const DIRECT_TEMPERATURE: f64 = 0.6;

const DIRECT_SYSTEM: &str = "You are RomanAI, offline assistant for RomanAILabs.\n\
                             Be precise, helpful, structured, and stable.\n";

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Scriptor,
    Master,
}

impl Side {
    /// Config key (`scriptor` / `master`).
    pub fn key(&self) -> &'static str {
        match self {
            Side::Scriptor => "scriptor",
            Side::Master => "master",
        }
    }

    /// Upper-case tag used in transcript lines.
    pub fn tag(&self) -> &'static str {
        match self {
            Side::Scriptor => "SCRIPTOR",
            Side::Master => "MASTER",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Side::Scriptor => "Scriptor",
            Side::Master => "Master",
        }
    }

    /// Backend display names offered on this side, direct model first.
    pub fn backends(&self) -> &'static [&'static str] {
        match self {
            Side::Scriptor => &[
                SCRIPTOR_MODEL_BACKEND,
                "Micro Helper",
                "Patcher Helper",
                "MultiModel Helper",
                "Tool Rewriter",
            ],
            Side::Master => &[MASTER_MODEL_BACKEND, "Master Helper", "MultiModel Helper"],
        }
    }

    /// Display name of this side's direct-model backend.
    pub fn model_backend(&self) -> &'static str {
        self.backends()[0]
    }

    pub fn is_direct(&self, backend_name: &str) -> bool {
        backend_name == self.model_backend()
    }

    /// Helper serving `backend_name` on this side. Unrecognized names get
    /// the side's default helper.
    pub fn map_backend(&self, backend_name: &str) -> HelperKind {
        match (self, backend_name) {
            (Side::Scriptor, "Micro Helper") => HelperKind::Micro,
            (Side::Scriptor, "Patcher Helper") => HelperKind::Patcher,
            (Side::Scriptor, "MultiModel Helper") => HelperKind::MultiModel,
            (Side::Scriptor, "Tool Rewriter") => HelperKind::Rewriter,
            (Side::Scriptor, _) => HelperKind::Scriptor,
            (Side::Master, "Master Helper") => HelperKind::Master,
            (Side::Master, _) => HelperKind::MultiModel,
        }
    }

    /// System prompt for a direct-model turn.
    pub fn direct_system_prompt(&self) -> String {
        let mode = match self {
            Side::Scriptor => "Mode: CODING. Generate correct, well-commented code.\n",
            Side::Master => "Mode: REASONING. Think in clear, layered steps.\n",
        };
        format!("{DIRECT_SYSTEM}{mode}")
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// LabSession
// ---------------------------------------------------------------------------

/// What [`LabSession::send`] did with a message.
#[derive(Debug)]
pub enum SendOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// The side is busy; show [`STILL_THINKING`].
    StillThinking,
    /// A worker thread is running the turn.
    Started(JoinHandle<()>),
}

struct SessionInner {
    router: Arc<HelperRouter>,
    scriptor_model: Option<Box<dyn Generate>>,
    master_model: Option<Box<dyn Generate>>,
    config: Mutex<LabConfig>,
    config_path: Option<PathBuf>,
    transcript: TranscriptLog,
    scriptor_gate: TurnGate,
    master_gate: TurnGate,
}

impl SessionInner {
    fn gate(&self, side: Side) -> &TurnGate {
        match side {
            Side::Scriptor => &self.scriptor_gate,
            Side::Master => &self.master_gate,
        }
    }

    fn direct_model(&self, side: Side) -> Option<&dyn Generate> {
        match side {
            Side::Scriptor => self.scriptor_model.as_deref(),
            Side::Master => self.master_model.as_deref(),
        }
    }

    fn remember_backend(&self, side: Side, backend_name: &str) {
        let mut config = self.config.lock();
        match side {
            Side::Scriptor => config.backend.scriptor = backend_name.to_string(),
            Side::Master => config.backend.master = backend_name.to_string(),
        }
        if let Some(path) = &self.config_path {
            if let Err(e) = config.save(path) {
                log::warn!("could not save backend choice: {}", e);
            }
        }
    }

    fn run_turn(&self, side: Side, backend_name: &str, text: &str) -> String {
        if side.is_direct(backend_name) {
            self.run_direct(side, text)
        } else {
            self.router.run(side.map_backend(backend_name).key(), text)
        }
    }

    fn run_direct(&self, side: Side, text: &str) -> String {
        let Some(model) = self.direct_model(side) else {
            return format!("[No {} model loaded.]", side.label());
        };
        let messages = [
            ChatMessage::system(side.direct_system_prompt()),
            ChatMessage::user(text),
        ];
        match model.generate(&messages) {
            Ok(content) => clean_markdown(&content),
            Err(e) => format!("[LLM error: {e}]"),
        }
    }
}

/// Shared lab session. Cheap to clone.
#[derive(Clone)]
pub struct LabSession {
    inner: Arc<SessionInner>,
}

impl LabSession {
    /// Session over `router` with no direct models and an unsaved default config.
    pub fn new(router: Arc<HelperRouter>, transcript: TranscriptLog) -> Self {
        Self::build(router, None, None, LabConfig::default(), None, transcript)
    }

    /// Session built from `config`: helpers, direct models and memory
    /// directory all come from it, and backend choices are saved to
    /// `config_path`.
    pub fn from_config(config: LabConfig, config_path: PathBuf, transcript: TranscriptLog) -> Self {
        let router = Arc::new(HelperRouter::from_config(&config, &config.memory_dir()));
        let direct = |endpoint: Option<&crate::llms::ModelEndpoint>| {
            endpoint.map(|e| {
                Box::new(LocalModelBackend::new(
                    e.clone().or_sampling(DIRECT_MAX_TOKENS, DIRECT_TEMPERATURE),
                )) as Box<dyn Generate>
            })
        };
        let scriptor = direct(config.direct_model(Side::Scriptor.key()));
        let master = direct(config.direct_model(Side::Master.key()));
        Self::build(router, scriptor, master, config, Some(config_path), transcript)
    }

    fn build(
        router: Arc<HelperRouter>,
        scriptor_model: Option<Box<dyn Generate>>,
        master_model: Option<Box<dyn Generate>>,
        config: LabConfig,
        config_path: Option<PathBuf>,
        transcript: TranscriptLog,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                router,
                scriptor_model,
                master_model,
                config: Mutex::new(config),
                config_path,
                transcript,
                scriptor_gate: TurnGate::new(),
                master_gate: TurnGate::new(),
            }),
        }
    }

    /// Replace the direct model of `side`.
    ///
    /// Only possible before the session is shared; returns the session
    /// unchanged otherwise.
    pub fn with_direct_model(mut self, side: Side, model: Box<dyn Generate>) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            match side {
                Side::Scriptor => inner.scriptor_model = Some(model),
                Side::Master => inner.master_model = Some(model),
            }
        } else {
            log::warn!("session already shared; {} model not replaced", side.label());
        }
        self
    }

    pub fn router(&self) -> &Arc<HelperRouter> {
        &self.inner.router
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> LabConfig {
        self.inner.config.lock().clone()
    }

    /// Backend last selected on `side`.
    pub fn selected_backend(&self, side: Side) -> String {
        let config = self.inner.config.lock();
        match side {
            Side::Scriptor => config.backend.scriptor.clone(),
            Side::Master => config.backend.master.clone(),
        }
    }

    pub fn is_thinking(&self, side: Side) -> bool {
        self.inner.gate(side).is_busy()
    }

    /// Submit `text` on `side` using the backend named `backend_name`.
    ///
    /// The user line is logged and the backend choice saved even when the
    /// side is busy. When a turn starts, `on_finish(side, answer)` is called
    /// from the worker thread after the answer is logged and the side is
    /// free again.
    pub fn send<F>(&self, side: Side, backend_name: &str, text: &str, on_finish: F) -> SendOutcome
    where
        F: FnOnce(Side, String) + Send + 'static,
    {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        let inner = &self.inner;
        inner.transcript.append(&format!("[{} USER] {}", side.tag(), text));
        inner.remember_backend(side, backend_name);

        let Some(guard) = inner.gate(side).try_acquire() else {
            log::debug!("{} busy, rejecting turn", side);
            return SendOutcome::StillThinking;
        };

        let inner = Arc::clone(&self.inner);
        let backend_name = backend_name.to_string();
        let text = text.to_string();
        let handle = std::thread::spawn(move || {
            let answer = inner.run_turn(side, &backend_name, &text);
            inner.transcript.append(&format!("[{} AI] {}", side.tag(), answer));
            drop(guard);
            on_finish(side, answer);
        });
        SendOutcome::Started(handle)
    }
}

impl std::fmt::Debug for LabSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabSession")
            .field("transcript", &self.inner.transcript.path())
            .field("scriptor_busy", &self.inner.scriptor_gate.is_busy())
            .field("master_busy", &self.inner.master_gate.is_busy())
            .finish_non_exhaustive()
    }
}
