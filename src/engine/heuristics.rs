//! Post-turn heuristics: state perturbation and importance scoring.
//!
//! Deterministic given their inputs. Keyword matching is a plain
//! case-insensitive substring test, so "sadly" counts as "sad".

use crate::state::{Axis, StateVector};

/// User words that raise empathy.
pub const DISTRESS_KEYWORDS: &[&str] = &["sad", "scared", "afraid", "lonely", "hurt"];

/// User words that raise creativity.
pub const IDEATION_KEYWORDS: &[&str] = &["idea", "story", "creative", "brainstorm"];

/// User phrases that mark a message as worth keeping long-term.
pub const IMPORTANCE_KEYWORDS: &[&str] = &["important", "remember", "my name", "my birthday", "my project"];

/// Importance of an ordinary user message.
pub const BASE_IMPORTANCE: f64 = 0.4;
/// Importance of a user message containing an [`IMPORTANCE_KEYWORDS`] phrase.
pub const HIGH_IMPORTANCE: f64 = 0.8;
/// Assistant entries are stored at this fraction of the user importance.
pub const ASSISTANT_IMPORTANCE_RATIO: f64 = 0.8;

const KEYWORD_BOOST: f64 = 0.08;
const TURN_ROTATION: f64 = 0.02;
const TURN_RELAX: f64 = 0.02;

pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

/// Importance score for a user message.
pub fn importance_for(user_text: &str) -> f64 {
    if contains_any(user_text, IMPORTANCE_KEYWORDS) {
        HIGH_IMPORTANCE
    } else {
        BASE_IMPORTANCE
    }
}

/// Nudge `state` after a finished turn.
///
/// - energy tracks answer length: `0.4 + chars/2000`, kept in `[0.2, 1.0]`
/// - an apologetic answer ("sorry") costs 5% coherence, anything else adds 3% (capped at 1)
/// - distress words in the user text add 0.08 empathy
/// - ideation words in the user text add 0.08 creativity
/// - then a small logic/creativity rotation and a relaxation toward neutral
pub fn update_state(state: &mut StateVector, user_text: &str, answer: &str) {
    let length = answer.chars().count() as f64;
    state.set(Axis::Energy, (0.4 + length / 2000.0).clamp(0.2, 1.0));

    if answer.to_lowercase().contains("sorry") {
        state.set(Axis::Coherence, state.coherence * 0.95);
    } else {
        state.set(Axis::Coherence, (state.coherence * 1.03).min(1.0));
    }

    if contains_any(user_text, DISTRESS_KEYWORDS) {
        state.nudge(Axis::Empathy, KEYWORD_BOOST);
    }
    if contains_any(user_text, IDEATION_KEYWORDS) {
        state.nudge(Axis::Creativity, KEYWORD_BOOST);
    }

    state.rotate_plane(Axis::Logic, Axis::Creativity, TURN_ROTATION);
    state.relax(TURN_RELAX);
}
