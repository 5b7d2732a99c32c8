//! One-turn-at-a-time gate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Allows at most one in-flight turn.
///
/// Cloning shares the gate.
#[derive(Debug, Clone, Default)]
pub struct TurnGate {
    busy: Arc<AtomicBool>,
}

impl TurnGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate, or `None` if a turn is already running.
    pub fn try_acquire(&self) -> Option<TurnGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TurnGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Holds the gate; dropping it lets the next turn in.
#[derive(Debug)]
pub struct TurnGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
