//! Memory entries and tier routing.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Importance at or above which a non-summary entry is routed to long-term memory.
pub const LONG_TERM_THRESHOLD: f64 = 0.7;

/// Who produced a memory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryRole {
    User,
    Assistant,
    System,
    Summary,
}

impl MemoryRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryRole::User => "user",
            MemoryRole::Assistant => "assistant",
            MemoryRole::System => "system",
            MemoryRole::Summary => "summary",
        }
    }
}

impl fmt::Display for MemoryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three in-memory collections an entry is placed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Rolling window of recent, ordinary entries.
    ShortTerm,
    /// Rolling window of conversation summaries.
    MidTerm,
    /// Unbounded list of important facts.
    LongTerm,
}

impl Tier {
    /// Decide where an entry belongs.
    ///
    /// Summaries always go to mid-term regardless of importance; anything
    /// else at or above [`LONG_TERM_THRESHOLD`] is long-term; the rest is
    /// short-term. The decision is made once and never revisited.
    pub fn route(role: MemoryRole, importance: f64) -> Tier {
        if role == MemoryRole::Summary {
            Tier::MidTerm
        } else if importance >= LONG_TERM_THRESHOLD {
            Tier::LongTerm
        } else {
            Tier::ShortTerm
        }
    }
}

/// A single immutable record in the memory log.
///
/// Serialized as exactly four JSON fields: `ts`, `role`, `content`, `importance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// ISO-8601 UTC timestamp.
    pub ts: String,
    pub role: MemoryRole,
    pub content: String,
    /// Clamped into `[0, 1]` at construction.
    pub importance: f64,
}

impl MemoryEntry {
    /// Create an entry stamped with the current UTC time.
    pub fn new(role: MemoryRole, content: impl Into<String>, importance: f64) -> Self {
        Self {
            ts: utc_timestamp(),
            role,
            content: content.into(),
            importance: clamp_importance(importance),
        }
    }

    /// The tier this entry routes to.
    pub fn tier(&self) -> Tier {
        Tier::route(self.role, self.importance)
    }
}

/// Clamp an importance score into `[0, 1]`; `NaN` becomes `0.0`.
pub fn clamp_importance(importance: f64) -> f64 {
    if importance.is_nan() {
        0.0
    } else {
        importance.clamp(0.0, 1.0)
    }
}

/// Current UTC time as a naive ISO-8601 string with microseconds.
pub fn utc_timestamp() -> String {
    Utc::now()
        .naive_utc()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route() {
        assert_eq!(Tier::route(MemoryRole::Summary, 0.0), Tier::MidTerm);
        assert_eq!(Tier::route(MemoryRole::Summary, 1.0), Tier::MidTerm);
        assert_eq!(Tier::route(MemoryRole::User, 0.7), Tier::LongTerm);
        assert_eq!(Tier::route(MemoryRole::Assistant, 0.69), Tier::ShortTerm);
        assert_eq!(Tier::route(MemoryRole::System, 0.3), Tier::ShortTerm);
    }

    #[test]
    fn test_importance_is_clamped() {
        assert_eq!(MemoryEntry::new(MemoryRole::User, "x", 3.0).importance, 1.0);
        assert_eq!(MemoryEntry::new(MemoryRole::User, "x", -1.0).importance, 0.0);
        assert_eq!(MemoryEntry::new(MemoryRole::User, "x", f64::NAN).importance, 0.0);
    }

    #[test]
    fn test_serializes_four_fields() {
        let entry = MemoryEntry {
            ts: "2025-01-01T00:00:00.000000".into(),
            role: MemoryRole::Summary,
            content: "héllo".into(),
            importance: 0.5,
        };
        let value = serde_json::to_value(&entry).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert_eq!(obj["role"], "summary");
        assert_eq!(obj["content"], "héllo");
    }

    #[test]
    fn test_timestamp_shape() {
        let ts = utc_timestamp();
        assert_eq!(ts.len(), "2025-01-01T00:00:00.000000".len());
        assert_eq!(&ts[10..11], "T");
    }
}
