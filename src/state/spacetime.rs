//! Lorentz-style boost over a weight vector.
//!
//! A cosmetic re-weighting of context weights: normalize, boost the first
//! two dimensions as if they were `(t, x)` coordinates, blend the result
//! with the unboosted unit vector and restore the original magnitude.
//! There is no physical meaning behind it.

/// Default boost velocity.
pub const DEFAULT_EPSILON: f64 = 0.12;

/// Default blend weight of the unboosted vector.
pub const DEFAULT_TAU: f64 = 0.5;

const MAX_VELOCITY: f64 = 0.999_999;

/// Apply the boost to `vec`.
///
/// # Arguments
/// * `vec` - Input weights. Empty input yields an empty vector.
/// * `epsilon` - Boost velocity, clamped to `±0.999999`.
/// * `tau` - Blend weight of the unboosted unit vector.
///
/// # Returns
/// A vector of the same length. A zero-norm input (below `1e-12`) yields zeros.
pub fn spacetime_optimize(vec: &[f64], epsilon: f64, tau: f64) -> Vec<f64> {
    if vec.is_empty() {
        return Vec::new();
    }

    let norm = vec.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm < 1e-12 {
        return vec![0.0; vec.len()];
    }

    let unit: Vec<f64> = vec.iter().map(|v| v / norm).collect();
    let eps = epsilon.clamp(-MAX_VELOCITY, MAX_VELOCITY);
    let gamma = 1.0 / (1.0 - eps * eps).sqrt();

    let mut boosted = unit.clone();
    if unit.len() >= 2 {
        let (t, x) = (unit[0], unit[1]);
        boosted[0] = gamma * (t - eps * x);
        boosted[1] = gamma * (x - eps * t);
    }

    boosted
        .iter()
        .zip(&unit)
        .map(|(b, u)| (b * (1.0 - tau) + u * tau) * norm)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_zero() {
        assert!(spacetime_optimize(&[], DEFAULT_EPSILON, DEFAULT_TAU).is_empty());
        assert_eq!(
            spacetime_optimize(&[0.0, 0.0, 0.0], DEFAULT_EPSILON, DEFAULT_TAU),
            vec![0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_zero_velocity_is_identity() {
        let input = [0.3, 0.4, 0.5];
        let out = spacetime_optimize(&input, 0.0, 0.5);
        for (a, b) in out.iter().zip(input.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_boost_only_touches_first_two_dims() {
        let input = [1.0, 0.0, 2.0];
        let out = spacetime_optimize(&input, 0.6, 0.0);
        let gamma = 1.0 / (1.0 - 0.36_f64).sqrt();
        assert!((out[0] - gamma).abs() < 1e-9);
        assert!((out[1] - gamma * -0.6).abs() < 1e-9);
        assert!((out[2] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_dimension_passes_through() {
        let out = spacetime_optimize(&[4.0], 0.9, 0.2);
        assert!((out[0] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_velocity_is_clamped() {
        let out = spacetime_optimize(&[1.0, 1.0], 5.0, 0.5);
        assert!(out.iter().all(|v| v.is_finite()));
    }
}
