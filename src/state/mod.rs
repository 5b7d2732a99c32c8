//! Cognitive state vector.
//!
//! Every engine owns one [`StateVector`]: four "cognitive" dimensions
//! (logic, empathy, creativity, memory) plus `energy` and `coherence`.
//! The vector is nudged after each turn and never persisted, so a fresh
//! process always starts from [`StateVector::default`].
//!
//! All scalars live in `[0, 1]`. Every mutating operation that could
//! leave that range finishes with [`StateVector::clamp`].

pub mod spacetime;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use spacetime::spacetime_optimize;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Neutral targets for `(logic, empathy, creativity, memory)` used by [`StateVector::relax`].
pub const NEUTRAL_COGNITIVE: [f64; 4] = [0.55, 0.55, 0.60, 0.62];

/// Neutral coherence target used by [`StateVector::relax`].
pub const NEUTRAL_COHERENCE: f64 = 0.85;

/// Default relaxation factor.
pub const DEFAULT_RELAX_FACTOR: f64 = 0.05;

/// Default rotation angle in radians.
pub const DEFAULT_ROTATION: f64 = 0.03;

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

/// A named scalar of the state vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Logic,
    Empathy,
    Creativity,
    Memory,
    Energy,
    Coherence,
}

impl Axis {
    /// All six axes in declaration order.
    pub const ALL: [Axis; 6] = [
        Axis::Logic,
        Axis::Empathy,
        Axis::Creativity,
        Axis::Memory,
        Axis::Energy,
        Axis::Coherence,
    ];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::Logic => "logic",
            Axis::Empathy => "empathy",
            Axis::Creativity => "creativity",
            Axis::Memory => "memory",
            Axis::Energy => "energy",
            Axis::Coherence => "coherence",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// StateVector
// ---------------------------------------------------------------------------

/// Six bounded scalars describing how the assistant "feels" right now.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    pub logic: f64,
    pub empathy: f64,
    pub creativity: f64,
    pub memory: f64,
    /// How "awake" the assistant is.
    pub energy: f64,
    /// How stable its reasoning feels.
    pub coherence: f64,
}

impl Default for StateVector {
    fn default() -> Self {
        Self {
            logic: 0.55,
            empathy: 0.55,
            creativity: 0.60,
            memory: 0.62,
            energy: 0.85,
            coherence: 0.80,
        }
    }
}

impl StateVector {
    /// Create a state vector with the default starting values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read one scalar.
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Logic => self.logic,
            Axis::Empathy => self.empathy,
            Axis::Creativity => self.creativity,
            Axis::Memory => self.memory,
            Axis::Energy => self.energy,
            Axis::Coherence => self.coherence,
        }
    }

    fn slot(&mut self, axis: Axis) -> &mut f64 {
        match axis {
            Axis::Logic => &mut self.logic,
            Axis::Empathy => &mut self.empathy,
            Axis::Creativity => &mut self.creativity,
            Axis::Memory => &mut self.memory,
            Axis::Energy => &mut self.energy,
            Axis::Coherence => &mut self.coherence,
        }
    }

    /// Set one scalar, clamping it into `[0, 1]`.
    pub fn set(&mut self, axis: Axis, value: f64) {
        *self.slot(axis) = clamp_unit(value);
    }

    /// Add `delta` to one scalar, clamping the result into `[0, 1]`.
    pub fn nudge(&mut self, axis: Axis, delta: f64) {
        let current = self.get(axis);
        self.set(axis, current + delta);
    }

    /// The four cognitive scalars `(logic, empathy, creativity, memory)`.
    pub fn as_vector(&self) -> [f64; 4] {
        [self.logic, self.empathy, self.creativity, self.memory]
    }

    /// Force all six scalars into `[0, 1]`.
    ///
    /// `NaN` collapses to `0.0` so the invariant survives degenerate input.
    pub fn clamp(&mut self) {
        for axis in Axis::ALL {
            let slot = self.slot(axis);
            *slot = clamp_unit(*slot);
        }
    }

    /// Move the cognitive scalars and coherence toward their neutral targets.
    ///
    /// Each of the four cognitive scalars moves `factor` of the remaining
    /// distance toward [`NEUTRAL_COGNITIVE`]; coherence moves toward
    /// [`NEUTRAL_COHERENCE`]. Energy is untouched.
    ///
    /// # Arguments
    /// * `factor` - Damping constant, usually small (default [`DEFAULT_RELAX_FACTOR`]).
    pub fn relax(&mut self, factor: f64) {
        let cognitive = [Axis::Logic, Axis::Empathy, Axis::Creativity, Axis::Memory];
        for (axis, neutral) in cognitive.into_iter().zip(NEUTRAL_COGNITIVE) {
            let slot = self.slot(axis);
            *slot += (neutral - *slot) * factor;
        }
        self.coherence += (NEUTRAL_COHERENCE - self.coherence) * factor;
        self.clamp();
    }

    /// Rotate the `(a, b)` plane by `theta` radians, then clamp.
    ///
    /// Treats the two scalars as a 2-D vector and applies the standard
    /// rotation matrix:
    ///
    /// ```text
    /// a' = a·cos θ − b·sin θ
    /// b' = a·sin θ + b·cos θ
    /// ```
    pub fn rotate_plane(&mut self, a: Axis, b: Axis, theta: f64) {
        let (sin_t, cos_t) = theta.sin_cos();
        let va = self.get(a);
        let vb = self.get(b);
        *self.slot(a) = va * cos_t - vb * sin_t;
        *self.slot(b) = va * sin_t + vb * cos_t;
        self.clamp();
    }

    /// Human-readable rendering of all six scalars at two decimals.
    pub fn describe(&self) -> String {
        format!(
            "4D State: Logic(w): {:.2}, Empathy(x): {:.2}, Creativity(y): {:.2}, Memory(z): {:.2}, Energy: {:.2}, Coherence: {:.2}",
            self.logic, self.empathy, self.creativity, self.memory, self.energy, self.coherence,
        )
    }

    /// Whether every scalar is inside `[0, 1]`.
    pub fn is_bounded(&self) -> bool {
        Axis::ALL
            .iter()
            .all(|axis| (0.0..=1.0).contains(&self.get(*axis)))
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_defaults() {
        let s = StateVector::default();
        assert_eq!(s.as_vector(), [0.55, 0.55, 0.60, 0.62]);
        assert_eq!(s.energy, 0.85);
        assert_eq!(s.coherence, 0.80);
    }

    #[test]
    fn test_clamp() {
        let mut s = StateVector {
            logic: -0.5,
            empathy: 1.7,
            creativity: f64::NAN,
            memory: 0.3,
            energy: 2.0,
            coherence: -3.0,
        };
        s.clamp();
        assert_eq!(s.logic, 0.0);
        assert_eq!(s.empathy, 1.0);
        assert_eq!(s.creativity, 0.0);
        assert_eq!(s.memory, 0.3);
        assert_eq!(s.energy, 1.0);
        assert_eq!(s.coherence, 0.0);
    }

    #[test]
    fn test_relax_moves_toward_neutral() {
        let mut s = StateVector {
            logic: 1.0,
            empathy: 0.0,
            creativity: 0.60,
            memory: 0.62,
            energy: 0.3,
            coherence: 0.5,
        };
        s.relax(0.5);
        assert!((s.logic - 0.775).abs() < 1e-12);
        assert!((s.empathy - 0.275).abs() < 1e-12);
        assert!((s.creativity - 0.60).abs() < 1e-12);
        assert!((s.coherence - 0.675).abs() < 1e-12);
        // Energy is not relaxed.
        assert_eq!(s.energy, 0.3);
    }

    #[test]
    fn test_rotate_plane_matches_rotation_matrix() {
        let mut s = StateVector::default();
        let theta = 0.02;
        let (w, y) = (s.logic, s.creativity);
        s.rotate_plane(Axis::Logic, Axis::Creativity, theta);
        assert!((s.logic - (w * theta.cos() - y * theta.sin())).abs() < 1e-12);
        assert!((s.creativity - (w * theta.sin() + y * theta.cos())).abs() < 1e-12);
        assert_eq!(s.empathy, 0.55);
    }

    #[test]
    fn test_rotate_plane_clamps() {
        let mut s = StateVector {
            logic: 1.0,
            creativity: 1.0,
            ..StateVector::default()
        };
        // Rotating (1, 1) by 45 degrees lands at (0, sqrt 2).
        s.rotate_plane(Axis::Logic, Axis::Creativity, std::f64::consts::FRAC_PI_4);
        assert!(s.logic.abs() < 1e-12);
        assert_eq!(s.creativity, 1.0);
    }

    #[test]
    fn test_clamp_invariant_under_random_operations() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut s = StateVector::default();
        for _ in 0..5_000 {
            if rng.gen_bool(0.5) {
                s.relax(rng.gen_range(-5.0..5.0));
            } else {
                let a = Axis::ALL[rng.gen_range(0..6)];
                let b = Axis::ALL[rng.gen_range(0..6)];
                s.rotate_plane(a, b, rng.gen_range(-10.0..10.0));
            }
            assert!(s.is_bounded(), "out of range: {:?}", s);
        }
    }

    #[test]
    fn test_nudge_saturates() {
        let mut s = StateVector::default();
        s.nudge(Axis::Empathy, 0.9);
        assert_eq!(s.empathy, 1.0);
        s.nudge(Axis::Empathy, -3.0);
        assert_eq!(s.empathy, 0.0);
    }

    #[test]
    fn test_describe_uses_two_decimals() {
        let text = StateVector::default().describe();
        assert!(text.contains("Logic(w): 0.55"));
        assert!(text.contains("Memory(z): 0.62"));
        assert!(text.contains("Energy: 0.85"));
        assert!(text.contains("Coherence: 0.80"));
    }
}
