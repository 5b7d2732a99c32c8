//! Three-tier memory store over an append-only log.
//!
//! The store keeps three in-memory views:
//!
//! | Tier       | Holds                              | Capacity        |
//! |------------|------------------------------------|-----------------|
//! | short-term | ordinary recent entries            | 32 (ring)       |
//! | mid-term   | `summary` entries                  | 64 (ring)       |
//! | long-term  | entries with importance >= 0.7     | unbounded       |
//!
//! Every `add` is also appended to a durable [`MemoryLog`]. On construction
//! the log is replayed through the same routing, so a restarted store
//! reproduces the tiers it had (modulo ring eviction). Log failures are
//! logged and swallowed; memory is best-effort.

use std::collections::VecDeque;
use std::path::Path;

use rand::seq::SliceRandom;

use crate::memory::entry::{MemoryEntry, MemoryRole, Tier};
use crate::memory::storage::{InMemoryLog, JsonlMemoryLog, MemoryLog};

/// Default short-term ring capacity.
pub const DEFAULT_SHORT_TERM_CAPACITY: usize = 32;
/// Default mid-term ring capacity.
pub const DEFAULT_MID_TERM_CAPACITY: usize = 64;
/// Importance used by [`MemoryStore::add`] callers that have no opinion.
pub const DEFAULT_IMPORTANCE: f64 = 0.3;
/// Default weight for [`MemoryStore::promote_summary`].
pub const DEFAULT_SUMMARY_WEIGHT: f64 = 0.6;
/// Floor applied to summary importance.
pub const MIN_SUMMARY_IMPORTANCE: f64 = 0.5;
/// Default length bound of the recall snippet, in characters.
pub const DEFAULT_RECALL_CHARS: usize = 1200;

const RECALL_LONG: usize = 4;
const RECALL_MID: usize = 4;
const RECALL_SHORT: usize = 6;

/// Layered memory for one engine.
pub struct MemoryStore {
    short_term: VecDeque<MemoryEntry>,
    mid_term: VecDeque<MemoryEntry>,
    long_term: Vec<MemoryEntry>,
    max_short: usize,
    max_mid: usize,
    log: Box<dyn MemoryLog>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("short_term", &self.short_term.len())
            .field("mid_term", &self.mid_term.len())
            .field("long_term", &self.long_term.len())
            .field("log", &self.log.describe())
            .finish()
    }
}

impl MemoryStore {
    /// Open the JSON-lines log in `dir` (created on first write) and replay it.
    pub fn open(dir: impl AsRef<Path>) -> Self {
        Self::with_log(Box::new(JsonlMemoryLog::in_dir(dir)))
    }

    /// A store whose log is kept in process memory only.
    pub fn ephemeral() -> Self {
        Self::with_log(Box::new(InMemoryLog::new()))
    }

    /// Build a store over `log` with default capacities and replay it.
    pub fn with_log(log: Box<dyn MemoryLog>) -> Self {
        Self::with_capacity(log, DEFAULT_SHORT_TERM_CAPACITY, DEFAULT_MID_TERM_CAPACITY)
    }

    /// Build a store over `log` with explicit ring capacities and replay it.
    ///
    /// # Arguments
    /// * `log` - Durable backing.
    /// * `max_short` - Short-term ring capacity.
    /// * `max_mid` - Mid-term ring capacity.
    pub fn with_capacity(log: Box<dyn MemoryLog>, max_short: usize, max_mid: usize) -> Self {
        let mut store = Self {
            short_term: VecDeque::with_capacity(max_short),
            mid_term: VecDeque::with_capacity(max_mid),
            long_term: Vec::new(),
            max_short,
            max_mid,
            log,
        };
        store.replay();
        store
    }

    fn replay(&mut self) {
        match self.log.replay() {
            Ok(entries) => {
                let count = entries.len();
                for mut entry in entries {
                    entry.importance = super::entry::clamp_importance(entry.importance);
                    self.place(entry);
                }
                log::debug!("replayed {} memory entries from {}", count, self.log.describe());
            }
            Err(e) => {
                log::warn!("could not load memory from {}: {:#}", self.log.describe(), e);
            }
        }
    }

    fn place(&mut self, entry: MemoryEntry) -> Tier {
        let tier = entry.tier();
        match tier {
            Tier::MidTerm => push_bounded(&mut self.mid_term, entry, self.max_mid),
            Tier::LongTerm => self.long_term.push(entry),
            Tier::ShortTerm => push_bounded(&mut self.short_term, entry, self.max_short),
        }
        tier
    }

    /// Record a new entry.
    ///
    /// The entry is stamped with the current UTC time, its importance is
    /// clamped, it is routed into a tier and appended to the log. A failed
    /// append is logged and otherwise ignored.
    ///
    /// # Returns
    /// The tier the entry was placed in.
    pub fn add(&mut self, role: MemoryRole, content: impl Into<String>, importance: f64) -> Tier {
        let entry = MemoryEntry::new(role, content, importance);
        if let Err(e) = self.log.append(&entry) {
            log::warn!("memory append to {} failed: {:#}", self.log.describe(), e);
        }
        self.place(entry)
    }

    /// Store a conversation summary in mid-term memory.
    ///
    /// Importance is `max(weight, 0.5)`.
    pub fn promote_summary(&mut self, text: impl Into<String>, weight: f64) -> Tier {
        self.add(MemoryRole::Summary, text, weight.max(MIN_SUMMARY_IMPORTANCE))
    }

    /// Render a short text blob for prompt injection.
    ///
    /// Up to four long-term entries sampled uniformly without replacement,
    /// then the latest four summaries and the latest six short-term entries
    /// (both oldest first). Lines are tagged `[LONG]`, `[SUMMARY]` and
    /// `[RECENT] role:`. When the blob is longer than `max_chars`
    /// characters only its trailing `max_chars` characters are kept, so the
    /// most recent content wins.
    pub fn recall_snippet(&self, max_chars: usize) -> String {
        let mut parts: Vec<String> = Vec::new();

        let mut rng = rand::thread_rng();
        for entry in self.long_term.choose_multiple(&mut rng, RECALL_LONG) {
            parts.push(format!("[LONG] {}", entry.content));
        }

        for entry in tail(&self.mid_term, RECALL_MID) {
            parts.push(format!("[SUMMARY] {}", entry.content));
        }

        for entry in tail(&self.short_term, RECALL_SHORT) {
            parts.push(format!("[RECENT] {}: {}", entry.role, entry.content));
        }

        let blob = parts.join("\n");
        let total = blob.chars().count();
        let blob = if total > max_chars {
            blob.chars().skip(total - max_chars).collect::<String>()
        } else {
            blob
        };
        blob.trim().to_string()
    }

    pub fn short_term(&self) -> impl Iterator<Item = &MemoryEntry> {
        self.short_term.iter()
    }

    pub fn mid_term(&self) -> impl Iterator<Item = &MemoryEntry> {
        self.mid_term.iter()
    }

    pub fn long_term(&self) -> &[MemoryEntry] {
        &self.long_term
    }

    /// Number of entries across all three tiers.
    pub fn len(&self) -> usize {
        self.short_term.len() + self.mid_term.len() + self.long_term.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn push_bounded(ring: &mut VecDeque<MemoryEntry>, entry: MemoryEntry, capacity: usize) {
    if capacity == 0 {
        return;
    }
    while ring.len() >= capacity {
        ring.pop_front();
    }
    ring.push_back(entry);
}

fn tail(ring: &VecDeque<MemoryEntry>, n: usize) -> impl Iterator<Item = &MemoryEntry> {
    ring.iter().skip(ring.len().saturating_sub(n))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
