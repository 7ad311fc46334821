//! Minimal 2D vector math for the flight model.
//!
//! Frame conventions follow the host engine (Godot 2D): +X is right, +Y is
//! down, positive rotation is clockwise on screen, and a body's local -Y axis
//! is its forward direction.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// 2D vector in world or local units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    /// Local forward (Godot `Vector2.Up`).
    pub const UP: Vec2 = Vec2 { x: 0.0, y: -1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians from +X.
    pub fn from_angle(angle: f32) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product.
    pub fn cross(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn distance_squared(self, other: Vec2) -> f32 {
        (self - other).length_squared()
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len < 1e-6 {
            Self::ZERO
        } else {
            Self::new(self.x / len, self.y / len)
        }
    }

    pub fn rotated(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Transform a world point into the local frame of a body at `origin`
/// rotated by `rotation` radians.
pub fn to_local(origin: Vec2, rotation: f32, point: Vec2) -> Vec2 {
    (point - origin).rotated(-rotation)
}

/// World-space forward vector of a body with the given rotation.
pub fn forward(rotation: f32) -> Vec2 {
    Vec2::UP.rotated(rotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_to_local_identity_frame() {
        let local = to_local(Vec2::new(10.0, 5.0), 0.0, Vec2::new(12.0, 4.0));
        assert_abs_diff_eq!(local.x, 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(local.y, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_to_local_rotated_frame() {
        // Rotated a quarter turn clockwise, the body's forward (-Y local) points at +X world.
        let fwd = forward(FRAC_PI_2);
        assert_abs_diff_eq!(fwd.x, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(fwd.y, 0.0, epsilon = 1e-5);

        let local = to_local(Vec2::ZERO, FRAC_PI_2, Vec2::new(1.0, 0.0));
        assert_abs_diff_eq!(local.x, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(local.y, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_normalized_zero_stays_zero() {
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
        let n = Vec2::new(3.0, 4.0).normalized();
        assert_abs_diff_eq!(n.length(), 1.0, epsilon = 1e-6);
    }
}
