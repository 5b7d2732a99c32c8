//! # RomanAI Lab
//!
//! An offline conversational reasoning core built around a persistent
//! six-axis cognitive [`StateVector`], a three-tier [`MemoryStore`] backed
//! by a line-delimited JSON log, and a [`ReasoningEngine`] that runs each
//! turn through optional council and self-evaluation passes before
//! committing an answer.
//!
//! Text generation is injected through the [`Generate`] trait: a locally
//! served model, a deterministic fallback or a multi-model fusion. Six
//! helpers wrap an engine each and are reachable through the
//! [`HelperRouter`], the two-sided [`LabSession`] and the HTTP
//! [`server`].

pub mod cli;
pub mod config;
pub mod engine;
pub mod helpers;
pub mod lab;
pub mod llm;
pub mod llms;
pub mod memory;
pub mod prompts;
pub mod server;
pub mod state;
pub mod utilities;

pub use config::LabConfig;
pub use engine::{EngineOptions, ReasoningEngine};
pub use helpers::{Helper, HelperKind, HelperRouter};
pub use lab::{LabSession, SendOutcome, Side};
pub use llm::{ChatMessage, Generate, GenerationError};
pub use memory::{MemoryEntry, MemoryRole, MemoryStore, Tier};
pub use state::StateVector;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
