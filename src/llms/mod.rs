//! Generation backends.
//!
//! - [`providers::local`]: OpenAI-compatible local model server client
//! - [`fallback`]: deterministic canned answers, no model required
//! - [`fusion`]: fan-out to sibling models and merge
//!
//! [`ModelOrFallback`] is what helpers actually hold: a model when one is
//! configured, the fallback otherwise.

pub mod fallback;
pub mod fusion;
pub mod providers;

use crate::llm::{ChatMessage, Generate, GenerationError};

pub use fallback::{FallbackBackend, FallbackStyle};
pub use fusion::{FusionBackend, Sibling};
pub use providers::local::{LocalModelBackend, ModelEndpoint};

/// A configured model with a fallback for when there is none.
///
/// Model errors are returned as bracketed content
/// (`[<label> model error: ...]`) rather than as an error, so one flaky
/// call shows up in the answer instead of aborting the turn.
pub struct ModelOrFallback {
    label: String,
    model: Option<Box<dyn Generate>>,
    fallback: FallbackBackend,
}

impl ModelOrFallback {
    /// # Arguments
    /// * `label` - Used in rendered model errors, e.g. `"Scriptor"`.
    /// * `model` - The configured model, if any.
    /// * `fallback` - Used when `model` is `None`.
    pub fn new(label: impl Into<String>, model: Option<Box<dyn Generate>>, fallback: FallbackBackend) -> Self {
        Self {
            label: label.into(),
            model,
            fallback,
        }
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }
}

impl Generate for ModelOrFallback {
    fn generate(&self, messages: &[ChatMessage]) -> Result<String, GenerationError> {
        match &self.model {
            Some(model) => match model.generate(messages) {
                Ok(text) => Ok(text),
                Err(e) => {
                    log::warn!("{} model call failed: {}", self.label, e);
                    Ok(format!("[{} model error: {}]", self.label, e))
                }
            },
            None => self.fallback.generate(messages),
        }
    }
}
