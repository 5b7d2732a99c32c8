//! Volatile memory log.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::memory::entry::MemoryEntry;
use crate::memory::storage::interface::MemoryLog;

/// A memory log that lives only as long as the process.
///
/// Clones share the same backing buffer, so one clone can be handed to a
/// store while another is kept to inspect or replay what was written.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLog {
    entries: Arc<Mutex<Vec<MemoryEntry>>>,
}

impl InMemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far.
    pub fn entries(&self) -> Vec<MemoryEntry> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl MemoryLog for InMemoryLog {
    fn append(&self, entry: &MemoryEntry) -> Result<(), anyhow::Error> {
        self.entries.lock().push(entry.clone());
        Ok(())
    }

    fn replay(&self) -> Result<Vec<MemoryEntry>, anyhow::Error> {
        Ok(self.entries())
    }

    fn describe(&self) -> String {
        "in-memory log".to_string()
    }
}
