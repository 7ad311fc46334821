//! ECS Components for the spacecraft simulation.
//!
//! Components are pure data containers attached to entities.
//! Per-tick logic lives in systems that query these components.

use crate::error::SimError;
use crate::math::Vec2;
use crate::pid::PidController;
use crate::thrust::{RotationGroup, Thruster, TranslationGroup};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// World position of a body's centre of mass.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn vec(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn distance_squared_to(&self, other: &Position) -> f32 {
        self.vec().distance_squared(other.vec())
    }
}

impl From<Vec2> for Position {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// Body orientation in radians (0 = forward along world -Y).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation(pub f32);

/// Linear velocity in world units per second.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

impl Velocity {
    pub fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }

    pub fn magnitude(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }
}

/// Angular velocity in radians per second.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AngularVelocity(pub f32);

/// Mass properties consumed by the integrator.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RigidBody {
    pub mass: f32,
    pub inertia: f32,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            mass: 10.0,
            inertia: 400.0,
        }
    }
}

/// Force and torque gathered during one physics tick.
/// Cleared by the integrator once applied.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ForceAccumulator {
    pub force: Vec2,
    pub torque: f32,
}

impl ForceAccumulator {
    pub fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    pub fn add_force_and_torque(&mut self, force: Vec2, torque: f32) {
        self.force += force;
        self.torque += torque;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Host-facing identifier of a spacecraft.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CraftId(pub u32);

/// Marker for craft driven by the swarm controller.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AiControlled;

/// Marker for the craft driven by player input.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PlayerControlled;

/// Swarm bookkeeping for an AI craft.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AiPilot {
    /// Number of decision passes this craft has received.
    pub dispatches: u64,
    pub last_steering_error: f32,
    pub last_fire_allowed: bool,
}

// ============================================================================
// HULL / LIFECYCLE
// ============================================================================

/// Destruction state. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HullState {
    Intact,
    /// Wrecked and counting down to teardown.
    Destroyed { despawn_remaining: f32 },
    /// Countdown elapsed; teardown has been issued.
    Scrapped,
}

/// Result of a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    Damaged,
    /// This hit destroyed the craft.
    Destroyed,
    /// The craft was already a wreck; health is untouched.
    AlreadyDestroyed,
}

#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Hull {
    pub health: i32,
    pub max_health: i32,
    pub state: HullState,
}

impl Hull {
    pub fn new(max_health: i32) -> Self {
        Self {
            health: max_health,
            max_health,
            state: HullState::Intact,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        !matches!(self.state, HullState::Intact)
    }

    /// Subtract `amount` from health. Does not perform the destruction
    /// transition itself; callers react to [`DamageOutcome::Destroyed`].
    pub fn apply_damage(&mut self, amount: i32) -> DamageOutcome {
        if self.is_destroyed() {
            return DamageOutcome::AlreadyDestroyed;
        }
        self.health = (self.health - amount).max(0);
        if self.health <= 0 {
            DamageOutcome::Destroyed
        } else {
            DamageOutcome::Damaged
        }
    }

    /// Enter the destroyed state. Returns false if already destroyed.
    pub fn destroy(&mut self, despawn_time: f32) -> bool {
        if self.is_destroyed() {
            return false;
        }
        self.state = HullState::Destroyed {
            despawn_remaining: despawn_time.max(0.0),
        };
        true
    }

    /// Advance the despawn countdown. Returns true exactly once, on the
    /// tick the countdown elapses.
    pub fn tick_despawn(&mut self, dt: f32) -> bool {
        match self.state {
            HullState::Destroyed { despawn_remaining } => {
                let remaining = despawn_remaining - dt;
                if remaining <= 0.0 {
                    self.state = HullState::Scrapped;
                    true
                } else {
                    self.state = HullState::Destroyed {
                        despawn_remaining: remaining,
                    };
                    false
                }
            }
            HullState::Intact | HullState::Scrapped => false,
        }
    }
}

impl Default for Hull {
    fn default() -> Self {
        Self::new(100)
    }
}

// ============================================================================
// FLIGHT CONTROL
// ============================================================================

/// Pilot intent plus the heading controller that turns it into a turn command.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct FlightControl {
    effort: Vec2,
    /// Signed steering error fed to the PID each physics tick.
    pub turn_offset: f32,
    pub pid: PidController,
    /// Last PID output, for snapshots.
    pub last_turn_command: f32,
}

impl FlightControl {
    pub fn effort(&self) -> Vec2 {
        self.effort
    }

    /// Set the translational intent. Each axis must lie in [-1, 1];
    /// out-of-range input is rejected and the previous effort is kept.
    pub fn set_effort(&mut self, effort: Vec2) -> Result<(), SimError> {
        if !effort.is_finite() {
            return Err(SimError::NonFiniteInput);
        }
        if !(-1.0..=1.0).contains(&effort.x) || !(-1.0..=1.0).contains(&effort.y) {
            return Err(SimError::MovementEffortOutOfRange {
                x: effort.x,
                y: effort.y,
            });
        }
        self.effort = effort;
        Ok(())
    }
}

/// The craft's thrusters, fixed at creation.
#[derive(Component, Debug, Clone, Default)]
pub struct Thrusters(pub Vec<Thruster>);

impl Thrusters {
    /// Seven-thruster fighter rig. The lateral pairs sit fore and aft of the
    /// centre of mass and double as rotation thrusters.
    pub fn fighter_layout() -> Self {
        use RotationGroup as R;
        use TranslationGroup as T;
        let main = 400.0;
        let lateral = 150.0;
        Self(vec![
            Thruster::new(T::Forward, R::None, Vec2::new(-4.0, 10.0), Vec2::new(0.0, -1.0), main),
            Thruster::new(T::Forward, R::None, Vec2::new(4.0, 10.0), Vec2::new(0.0, -1.0), main),
            Thruster::new(T::Backward, R::None, Vec2::new(0.0, -10.0), Vec2::new(0.0, 1.0), main * 0.5),
            Thruster::new(T::Left, R::Left, Vec2::new(0.0, -8.0), Vec2::new(-1.0, 0.0), lateral),
            Thruster::new(T::Left, R::Right, Vec2::new(0.0, 8.0), Vec2::new(-1.0, 0.0), lateral),
            Thruster::new(T::Right, R::Right, Vec2::new(0.0, -8.0), Vec2::new(1.0, 0.0), lateral),
            Thruster::new(T::Right, R::Left, Vec2::new(0.0, 8.0), Vec2::new(1.0, 0.0), lateral),
        ])
    }

    /// Freeze the firing pattern of a wreck: whatever is lit stays lit at
    /// full force, and the logical enable flags are cleared.
    pub fn lock_for_wreck(&mut self) {
        for thruster in &mut self.0 {
            thruster.stuck_open = thruster.enabled;
            thruster.enabled = false;
        }
    }

    pub fn enabled_count(&self) -> usize {
        self.0.iter().filter(|t| t.enabled || t.stuck_open).count()
    }
}

// ============================================================================
// WEAPONS / COLLISION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponGroup {
    Primary,
    Secondary,
}

impl WeaponGroup {
    /// Host-facing group index. Unknown indices select nothing.
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::Primary),
            1 => Some(Self::Secondary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub group: WeaponGroup,
    /// Seconds between shots.
    pub cooldown: f32,
    pub cooldown_remaining: f32,
    /// Muzzle position in the owner's local frame.
    pub muzzle_offset: Vec2,
    /// Mirrors the owner's collision layer.
    pub collision_layer: u32,
}

impl Weapon {
    pub fn new(group: WeaponGroup, cooldown: f32, muzzle_offset: Vec2) -> Self {
        Self {
            group,
            cooldown,
            cooldown_remaining: 0.0,
            muzzle_offset,
            collision_layer: 1,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining <= 0.0
    }

    /// Fire if ready and restart the cooldown.
    pub fn try_fire(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.cooldown_remaining = self.cooldown;
        true
    }

    pub fn tick(&mut self, dt: f32) {
        self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);
    }
}

/// The craft's weapons, fixed at creation. May be empty.
#[derive(Component, Debug, Clone, Default)]
pub struct Armament(pub Vec<Weapon>);

/// Physics collision filtering for a body.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionLayers {
    pub layer: u32,
    pub membership: u32,
    pub mask: u32,
}

impl CollisionLayers {
    /// Place a body on a single layer (1..=32), colliding with layers 1..=16.
    pub fn on_layer(layer: u32) -> Result<Self, SimError> {
        if !(1..=32).contains(&layer) {
            return Err(SimError::InvalidCollisionLayer(layer));
        }
        Ok(Self {
            layer,
            membership: 1u32 << (layer - 1),
            mask: 0xFFFF,
        })
    }
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self {
            layer: 1,
            membership: 1,
            mask: 0xFFFF,
        }
    }
}

// ============================================================================
// PLANETS
// ============================================================================

/// A gravity well moving on a circular orbit.
#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    pub name: String,
    pub orbit_center: Vec2,
    pub orbit_radius: f32,
    /// Current orbit angle in radians.
    pub orbit_angle: f32,
    /// Revolutions per minute.
    pub orbit_frequency: f32,
    pub gravity_strength: f32,
    pub gravity_source: crate::gravity::GravitySourceId,
}

impl Planet {
    pub fn orbit_position(&self) -> Vec2 {
        self.orbit_center + Vec2::from_angle(self.orbit_angle) * self.orbit_radius
    }
}

// ============================================================================
// BUNDLE HELPERS
// ============================================================================

/// Bundle for spawning a complete spacecraft entity.
#[derive(Bundle, Default)]
pub struct SpacecraftBundle {
    pub id: CraftId,
    pub position: Position,
    pub rotation: Rotation,
    pub velocity: Velocity,
    pub angular_velocity: AngularVelocity,
    pub body: RigidBody,
    pub forces: ForceAccumulator,
    pub hull: Hull,
    pub flight: FlightControl,
    pub thrusters: Thrusters,
    pub armament: Armament,
    pub collision: CollisionLayers,
}

/// Bundle for AI components to add to a spacecraft.
#[derive(Bundle, Default)]
pub struct AiBundle {
    pub ai_controlled: AiControlled,
    pub pilot: AiPilot,
}
