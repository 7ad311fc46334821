//! Gravity collaborator.
//!
//! Craft only ever ask for the force at their position. The field behind the
//! trait is owned by the host and injected once, before any craft exists.

use crate::math::Vec2;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Handle of a registered gravity source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GravitySourceId(pub u32);

pub trait GravityField: Send + Sync {
    fn register_source(&mut self, position: Vec2, strength: f32) -> GravitySourceId;
    fn move_source(&mut self, id: GravitySourceId, position: Vec2);
    fn force_at(&self, position: Vec2) -> Vec2;
}

/// Field that exerts no force.
#[derive(Debug, Default)]
pub struct NoGravity {
    next_id: u32,
}

impl GravityField for NoGravity {
    fn register_source(&mut self, _position: Vec2, _strength: f32) -> GravitySourceId {
        let id = GravitySourceId(self.next_id);
        self.next_id += 1;
        id
    }

    fn move_source(&mut self, _id: GravitySourceId, _position: Vec2) {}

    fn force_at(&self, _position: Vec2) -> Vec2 {
        Vec2::ZERO
    }
}

#[derive(Debug, Clone, Copy)]
struct PointSource {
    position: Vec2,
    strength: f32,
}

/// Inverse-square attraction towards a set of point sources.
#[derive(Debug)]
pub struct PointGravityField {
    sources: Vec<PointSource>,
    /// Distance below which the force stops growing.
    softening: f32,
}

impl PointGravityField {
    pub fn new(softening: f32) -> Self {
        Self {
            sources: Vec::new(),
            softening,
        }
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

impl Default for PointGravityField {
    fn default() -> Self {
        Self::new(50.0)
    }
}

impl GravityField for PointGravityField {
    fn register_source(&mut self, position: Vec2, strength: f32) -> GravitySourceId {
        self.sources.push(PointSource { position, strength });
        GravitySourceId(self.sources.len() as u32 - 1)
    }

    fn move_source(&mut self, id: GravitySourceId, position: Vec2) {
        if let Some(source) = self.sources.get_mut(id.0 as usize) {
            source.position = position;
        }
    }

    fn force_at(&self, position: Vec2) -> Vec2 {
        let min_dist_sq = self.softening * self.softening;
        let mut total = Vec2::ZERO;
        for source in &self.sources {
            let delta = source.position - position;
            let dist_sq = delta.length_squared().max(min_dist_sq);
            total += delta.normalized() * (source.strength / dist_sq);
        }
        total
    }
}

/// The injected field.
#[derive(Resource)]
pub struct GravityResource(pub Box<dyn GravityField>);

impl Default for GravityResource {
    fn default() -> Self {
        Self(Box::new(NoGravity::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_no_gravity_is_zero() {
        let mut field = NoGravity::default();
        let a = field.register_source(Vec2::ZERO, 1e6);
        let b = field.register_source(Vec2::ZERO, 1e6);
        assert_ne!(a, b);
        assert_eq!(field.force_at(Vec2::new(10.0, 0.0)), Vec2::ZERO);
    }

    #[test]
    fn test_point_gravity_inverse_square() {
        let mut field = PointGravityField::new(1.0);
        field.register_source(Vec2::ZERO, 400.0);
        let near = field.force_at(Vec2::new(10.0, 0.0));
        let far = field.force_at(Vec2::new(20.0, 0.0));
        assert_abs_diff_eq!(near.x, -4.0, epsilon = 1e-5);
        assert_abs_diff_eq!(far.x, -1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(near.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_point_gravity_softened_and_movable() {
        let mut field = PointGravityField::new(10.0);
        let id = field.register_source(Vec2::ZERO, 100.0);
        let f = field.force_at(Vec2::new(0.0, 1.0));
        assert_abs_diff_eq!(f.y, -1.0, epsilon = 1e-5);
        assert_eq!(field.force_at(Vec2::ZERO), Vec2::ZERO);

        field.move_source(id, Vec2::new(0.0, 100.0));
        assert!(field.force_at(Vec2::ZERO).y > 0.0);
    }
}
