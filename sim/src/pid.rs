//! Discrete PID controller with a clamped output.
//!
//! The integral accumulator has no windup guard: it keeps growing under a
//! sustained one-sided error while the output stays pinned at the clamp.

use serde::{Deserialize, Serialize};

/// Proportional gain of the heading loop.
pub const TURN_KP: f32 = 10.0;
/// Integral gain of the heading loop.
pub const TURN_KI: f32 = 15.0;
/// Derivative gain of the heading loop.
pub const TURN_KD: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidController {
    kp: f32,
    ki: f32,
    kd: f32,
    min: f32,
    max: f32,
    setpoint: f32,
    integral: f32,
    previous_error: f32,
}

impl PidController {
    pub fn new(kp: f32, ki: f32, kd: f32, min: f32, max: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            min,
            max,
            setpoint: 0.0,
            integral: 0.0,
            previous_error: 0.0,
        }
    }

    /// Controller used by every spacecraft to drive its steering error to zero.
    pub fn turn() -> Self {
        Self::new(TURN_KP, TURN_KI, TURN_KD, -1.0, 1.0)
    }

    pub fn with_setpoint(mut self, setpoint: f32) -> Self {
        self.setpoint = setpoint;
        self
    }

    /// Run one controller step and return the clamped control variable.
    ///
    /// A zero-length (or non-finite) `dt` yields the proportional term alone
    /// and leaves the accumulator and previous error untouched.
    pub fn compute(&mut self, process_variable: f32, dt: f32) -> f32 {
        let error = self.setpoint - process_variable;

        if dt <= 0.0 || !dt.is_finite() {
            return (self.kp * error).clamp(self.min, self.max);
        }

        self.integral += error * dt;
        let derivative = (error - self.previous_error) / dt;
        self.previous_error = error;

        let output = self.kp * error + self.ki * self.integral + self.kd * derivative;
        output.clamp(self.min, self.max)
    }

    /// Accumulated `error * dt`.
    pub fn integral(&self) -> f32 {
        self.integral
    }

    pub fn previous_error(&self) -> f32 {
        self.previous_error
    }

    pub fn output_range(&self) -> (f32, f32) {
        (self.min, self.max)
    }
}

impl Default for PidController {
    fn default() -> Self {
        Self::turn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_integral_grows_under_constant_error() {
        let mut pid = PidController::turn();
        let mut last = 0.0f32;
        for _ in 0..50 {
            pid.compute(0.3, 1.0 / 60.0);
            assert!(pid.integral().abs() > last.abs());
            last = pid.integral();
        }
        // Error is -0.3 because the setpoint is zero.
        assert!(pid.integral() < 0.0);
    }

    #[test]
    fn test_output_clamped_for_pathological_error() {
        let mut pid = PidController::turn();
        for pv in [1e9f32, -1e9, 3.0, -3.0, 1e-3] {
            let out = pid.compute(pv, 0.016);
            assert!((-1.0..=1.0).contains(&out), "output {out} escaped clamp");
        }
    }

    #[test]
    fn test_zero_dt_is_proportional_only() {
        let mut pid = PidController::new(10.0, 15.0, 5.0, -100.0, 100.0);
        let out = pid.compute(0.5, 0.0);
        assert!(!out.is_nan());
        assert_abs_diff_eq!(out, -5.0, epsilon = 1e-6);
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.previous_error(), 0.0);
    }

    #[test]
    fn test_zero_dt_output_still_clamped() {
        let mut pid = PidController::turn();
        assert_eq!(pid.compute(0.5, 0.0), -1.0);
    }

    #[test]
    fn test_single_step_terms() {
        let mut pid = PidController::new(1.0, 2.0, 3.0, -100.0, 100.0);
        // error = -1, integral = -0.5, derivative = (-1 - 0) / 0.5 = -2
        let out = pid.compute(1.0, 0.5);
        assert_abs_diff_eq!(out, -1.0 + 2.0 * -0.5 + 3.0 * -2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_accumulator_not_bounded_by_clamp() {
        let mut pid = PidController::turn();
        for _ in 0..600 {
            assert_eq!(pid.compute(-1.0, 0.1), 1.0);
        }
        assert!(pid.integral() > 50.0);
    }
}
