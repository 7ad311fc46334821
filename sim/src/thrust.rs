//! Thrust allocation: movement intent + turn command -> per-thruster state.
//!
//! Allocation is a pure function of its inputs and is recomputed every
//! physics tick. Translation and rotation eligibility are OR-ed per thruster.

use crate::math::Vec2;
use serde::{Deserialize, Serialize};

/// Which translational effect a thruster produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TranslationGroup {
    Forward,
    Backward,
    Left,
    Right,
    #[default]
    None,
}

/// Which rotational effect a thruster produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RotationGroup {
    Left,
    Right,
    #[default]
    None,
}

/// A single thruster mounted on a craft.
///
/// `offset` and `direction` are in the owner's local frame; `direction` is
/// the direction of the force the thruster applies to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thruster {
    pub translation: TranslationGroup,
    pub rotation: RotationGroup,
    pub offset: Vec2,
    pub direction: Vec2,
    pub max_force: f32,
    /// Logical state, recomputed every tick.
    pub enabled: bool,
    /// Set on destruction for every thruster that was firing at that moment.
    pub stuck_open: bool,
}

impl Thruster {
    pub fn new(
        translation: TranslationGroup,
        rotation: RotationGroup,
        offset: Vec2,
        direction: Vec2,
        max_force: f32,
    ) -> Self {
        Self {
            translation,
            rotation,
            offset,
            direction: direction.normalized(),
            max_force,
            enabled: false,
            stuck_open: false,
        }
    }
}

/// Allocation result for one thruster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrustCommand {
    pub enabled: bool,
    /// In [0, 1]. Zero for disabled thrusters.
    pub force_factor: f32,
}

impl ThrustCommand {
    pub const OFF: ThrustCommand = ThrustCommand {
        enabled: false,
        force_factor: 0.0,
    };
}

/// Decide one thruster's state.
pub fn allocate_one(thruster: &Thruster, effort: Vec2, turn_command: f32, destroyed: bool) -> ThrustCommand {
    if destroyed {
        // A wreck keeps burning whatever was lit when it died.
        return if thruster.stuck_open {
            ThrustCommand {
                enabled: true,
                force_factor: 1.0,
            }
        } else {
            ThrustCommand::OFF
        };
    }

    let mut enabled = match thruster.translation {
        TranslationGroup::Forward => effort.y < 0.0,
        TranslationGroup::Backward => effort.y > 0.0,
        TranslationGroup::Left => effort.x < 0.0,
        TranslationGroup::Right => effort.x > 0.0,
        TranslationGroup::None => false,
    };

    let used_for_turning = match thruster.rotation {
        RotationGroup::Left => turn_command < 0.0,
        RotationGroup::Right => turn_command > 0.0,
        RotationGroup::None => false,
    };
    enabled |= used_for_turning;

    if !enabled {
        return ThrustCommand::OFF;
    }

    let force_factor = if used_for_turning {
        turn_command.abs().min(1.0)
    } else {
        1.0
    };

    ThrustCommand {
        enabled,
        force_factor,
    }
}

/// Decide every thruster's state, in thruster order.
pub fn allocate(thrusters: &[Thruster], effort: Vec2, turn_command: f32, destroyed: bool) -> Vec<ThrustCommand> {
    thrusters
        .iter()
        .map(|t| allocate_one(t, effort, turn_command, destroyed))
        .collect()
}

/// World-space force and torque a thruster applies to its owner.
pub fn thruster_force(thruster: &Thruster, force_factor: f32, owner_rotation: f32) -> (Vec2, f32) {
    let force = thruster.direction.rotated(owner_rotation) * (thruster.max_force * force_factor);
    let arm = thruster.offset.rotated(owner_rotation);
    (force, arm.cross(force))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Thrusters;

    fn layout() -> Vec<Thruster> {
        Thrusters::fighter_layout().0
    }

    #[test]
    fn test_full_forward_enables_only_forward_group() {
        let thrusters = layout();
        let commands = allocate(&thrusters, Vec2::new(0.0, -1.0), 0.0, false);
        for (t, c) in thrusters.iter().zip(&commands) {
            if t.translation == TranslationGroup::Forward {
                assert!(c.enabled);
                assert_eq!(c.force_factor, 1.0);
            } else {
                assert!(!c.enabled, "{:?} should be off", t.translation);
            }
        }
        assert!(commands.iter().any(|c| c.enabled));
    }

    #[test]
    fn test_left_turn_scales_with_command() {
        let thrusters = layout();
        for effort in [Vec2::ZERO, Vec2::new(1.0, 1.0), Vec2::new(-1.0, -1.0)] {
            let commands = allocate(&thrusters, effort, -0.5, false);
            for (t, c) in thrusters.iter().zip(&commands) {
                if t.rotation == RotationGroup::Left {
                    assert!(c.enabled);
                    assert_eq!(c.force_factor, 0.5);
                }
                if t.rotation == RotationGroup::Right && t.translation == TranslationGroup::None {
                    assert!(!c.enabled);
                }
            }
        }
    }

    #[test]
    fn test_translation_and_turn_combine() {
        let t = Thruster::new(
            TranslationGroup::Right,
            RotationGroup::Right,
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 0.0),
            100.0,
        );
        // Enabled by translation alone: full force.
        let c = allocate_one(&t, Vec2::new(1.0, 0.0), 0.0, false);
        assert_eq!(c, ThrustCommand { enabled: true, force_factor: 1.0 });
        // Also used for turning: turn authority wins.
        let c = allocate_one(&t, Vec2::new(1.0, 0.0), 0.25, false);
        assert_eq!(c, ThrustCommand { enabled: true, force_factor: 0.25 });
        // Turning the other way leaves translation eligibility intact.
        let c = allocate_one(&t, Vec2::new(1.0, 0.0), -0.25, false);
        assert_eq!(c, ThrustCommand { enabled: true, force_factor: 1.0 });
    }

    #[test]
    fn test_destroyed_locks_previously_enabled_at_full_force() {
        let mut thrusters = layout();
        thrusters[0].stuck_open = true;
        thrusters[2].stuck_open = true;
        let commands = allocate(&thrusters, Vec2::new(0.0, 1.0), 0.7, true);
        for (i, c) in commands.iter().enumerate() {
            if i == 0 || i == 2 {
                assert_eq!(*c, ThrustCommand { enabled: true, force_factor: 1.0 });
            } else {
                assert_eq!(*c, ThrustCommand::OFF);
            }
        }
    }

    #[test]
    fn test_thruster_force_and_torque() {
        // Pushes the owner to +X from a mount below the centre of mass.
        let t = Thruster::new(
            TranslationGroup::Right,
            RotationGroup::None,
            Vec2::new(0.0, 2.0),
            Vec2::new(1.0, 0.0),
            50.0,
        );
        let (force, torque) = thruster_force(&t, 0.5, 0.0);
        assert_eq!(force, Vec2::new(25.0, 0.0));
        assert_eq!(torque, -50.0);
    }
}
