//! Dispatch by backend key.

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::LabConfig;
use crate::memory::MemoryStore;

use super::{Helper, HelperKind};

/// Holds the loaded helpers and routes prompts to them by key.
///
/// Any subset of helpers may be loaded; asking for one that is not yields
/// `[<Label> backend missing]` rather than an error.
#[derive(Debug, Default)]
pub struct HelperRouter {
    helpers: BTreeMap<HelperKind, Helper>,
}

impl HelperRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every helper, each with a durable memory store in `memory_dir` and
    /// the models listed for it in `config`.
    pub fn from_config(config: &LabConfig, memory_dir: &Path) -> Self {
        let mut router = Self::new();
        for kind in HelperKind::ALL {
            let models = config.models.helper_models(kind.key());
            log::debug!("loading {} ({} model(s))", kind.engine_name(), models.len());
            router.insert(Helper::from_models(kind, models, MemoryStore::open(memory_dir)));
        }
        router
    }

    /// Every helper with in-memory storage and no models.
    pub fn ephemeral() -> Self {
        let mut router = Self::new();
        for kind in HelperKind::ALL {
            router.insert(Helper::from_models(kind, &[], MemoryStore::ephemeral()));
        }
        router
    }

    /// Add or replace the helper of `helper.kind()`.
    pub fn insert(&mut self, helper: Helper) -> Option<Helper> {
        self.helpers.insert(helper.kind(), helper)
    }

    pub fn with_helper(mut self, helper: Helper) -> Self {
        self.insert(helper);
        self
    }

    pub fn get(&self, kind: HelperKind) -> Option<&Helper> {
        self.helpers.get(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = HelperKind> + '_ {
        self.helpers.keys().copied()
    }

    /// Run `prompt` on the helper named `backend` (case-insensitive).
    pub fn run(&self, backend: &str, prompt: &str) -> String {
        let Some(kind) = HelperKind::from_key(backend) else {
            return format!("[Unknown backend: {}]", backend.to_lowercase());
        };
        match self.helpers.get(&kind) {
            Some(helper) => helper.run(prompt),
            None => format!("[{} backend missing]", kind.label()),
        }
    }

    /// Recall snippet of the master helper's engine.
    pub fn recall_memory(&self) -> String {
        self.get(HelperKind::Master)
            .map(Helper::recall_memory)
            .unwrap_or_default()
    }

    /// Store a fact through the master helper's engine.
    pub fn store_memory(&self, text: &str) -> bool {
        self.get(HelperKind::Master)
            .map(|h| h.store_memory(text))
            .unwrap_or(false)
    }
}
