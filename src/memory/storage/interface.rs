//! Storage interface for the memory log.

use crate::memory::entry::MemoryEntry;

/// Durable, append-only backing for a [`MemoryStore`](crate::memory::MemoryStore).
///
/// Implementations never rewrite or delete entries. Errors are reported
/// to the caller, which decides whether they matter; the store itself
/// treats every failure here as non-fatal.
pub trait MemoryLog: Send + Sync {
    /// Append one entry.
    ///
    /// # Arguments
    /// * `entry` - The entry to persist.
    fn append(&self, entry: &MemoryEntry) -> Result<(), anyhow::Error>;

    /// Read back every well-formed entry in write order.
    ///
    /// Malformed records are skipped individually. A log that does not
    /// exist yet replays as empty.
    fn replay(&self) -> Result<Vec<MemoryEntry>, anyhow::Error>;

    /// Short label for log messages.
    fn describe(&self) -> String {
        "memory log".to_string()
    }
}
