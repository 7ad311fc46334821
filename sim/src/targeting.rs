//! Targeting geometry: world-space desired direction -> signed steering error.
//!
//! The steering error is the negated local X of the point one unit along the
//! desired direction. It is not an angle: it is monotonic near zero, peaks at
//! a quarter turn and shrinks again past it.

use crate::math::{to_local, Vec2};
use rand::Rng;
use std::f32::consts::TAU;

/// Scale of the per-axis jitter added by autonomous pilots.
pub const JITTER_DEVIATION: f32 = 0.2;

/// Signed steering error of a body at `position` with `rotation` that wants
/// to face `desired_direction`. Positive means the desired direction lies to
/// the body's left.
pub fn steering_error(position: Vec2, rotation: f32, desired_direction: Vec2) -> f32 {
    -to_local(position, rotation, desired_direction + position).x
}

/// [`steering_error`] with a fresh uniform offset in `[-deviation, deviation]`
/// per axis added to the direction first.
pub fn jittered_steering_error<R: Rng + ?Sized>(
    position: Vec2,
    rotation: f32,
    desired_direction: Vec2,
    deviation: f32,
    rng: &mut R,
) -> f32 {
    let jitter = Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0)) * deviation;
    steering_error(position, rotation, desired_direction + jitter)
}

/// Uniformly distributed unit vector.
pub fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    Vec2::from_angle(rng.gen_range(0.0..TAU))
}

/// Unit vector from `from` towards `to`; zero when they coincide.
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_aligned_target_has_zero_error() {
        let pos = Vec2::new(100.0, -40.0);
        assert_abs_diff_eq!(steering_error(pos, 0.0, Vec2::UP), 0.0, epsilon = 1e-5);
        // Facing +X after a quarter turn.
        assert_abs_diff_eq!(steering_error(pos, FRAC_PI_2, Vec2::new(1.0, 0.0)), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_error_sign_follows_side() {
        // Target to the right of a craft facing up.
        let right = steering_error(Vec2::ZERO, 0.0, Vec2::new(1.0, -1.0).normalized());
        assert!(right < 0.0);
        let left = steering_error(Vec2::ZERO, 0.0, Vec2::new(-1.0, -1.0).normalized());
        assert!(left > 0.0);
        assert_abs_diff_eq!(right, -left, epsilon = 1e-6);
    }

    #[test]
    fn test_error_not_monotonic_past_quarter_turn() {
        let quarter = steering_error(Vec2::ZERO, 0.0, Vec2::new(1.0, 0.0));
        let behind = steering_error(Vec2::ZERO, 0.0, Vec2::new(1.0, 1.0).normalized());
        assert_abs_diff_eq!(quarter, -1.0, epsilon = 1e-6);
        assert!(behind.abs() < quarter.abs());
    }

    #[test]
    fn test_jitter_is_bounded_and_resampled() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let samples: Vec<f32> = (0..32)
            .map(|_| jittered_steering_error(Vec2::ZERO, 0.0, Vec2::UP, JITTER_DEVIATION, &mut rng))
            .collect();
        assert!(samples.iter().all(|e| e.abs() <= JITTER_DEVIATION + 1e-6));
        assert!(samples.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_zero_deviation_matches_plain_error() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let dir = Vec2::new(0.3, -0.9).normalized();
        let plain = steering_error(Vec2::new(5.0, 5.0), 0.4, dir);
        let jittered = jittered_steering_error(Vec2::new(5.0, 5.0), 0.4, dir, 0.0, &mut rng);
        assert_abs_diff_eq!(plain, jittered, epsilon = 1e-6);
    }

    #[test]
    fn test_random_direction_is_unit() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..16 {
            assert_abs_diff_eq!(random_direction(&mut rng).length(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_direction_to() {
        let d = direction_to(Vec2::new(1.0, 1.0), Vec2::new(4.0, 5.0));
        assert_abs_diff_eq!(d.x, 0.6, epsilon = 1e-6);
        assert_abs_diff_eq!(d.y, 0.8, epsilon = 1e-6);
        assert_eq!(direction_to(Vec2::ZERO, Vec2::ZERO), Vec2::ZERO);
    }
}
