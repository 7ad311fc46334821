//! Simulation configuration and tick bookkeeping resources.

use crate::error::SimError;
use crate::math::Vec2;
use bevy_ecs::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Collision layer reserved for swarm-controlled craft.
pub const AI_COLLISION_LAYER: u32 = 2;
/// Collision layer of the player craft.
pub const PLAYER_COLLISION_LAYER: u32 = 1;

/// Physics tick rate presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimRate {
    Normal30Hz,
    Smooth60Hz,
    Precise120Hz,
}

impl SimRate {
    pub fn hz(self) -> f32 {
        match self {
            SimRate::Normal30Hz => 30.0,
            SimRate::Smooth60Hz => 60.0,
            SimRate::Precise120Hz => 120.0,
        }
    }
}

/// Tunables of the simulation. Controller gains are constants in [`crate::pid`].
#[derive(Resource, Debug, Clone)]
pub struct SimConfig {
    /// Physics timestep in seconds (1/60 = 60 Hz).
    pub fixed_timestep: f32,
    /// Seconds a wreck lingers before teardown.
    pub despawn_time: f32,
    /// Per-axis jitter applied to swarm aiming.
    pub jitter_deviation: f32,
    pub flight_envelope_center: Vec2,
    /// Craft farther than this from the centre are wrecked.
    pub flight_envelope_radius: f32,
    /// Seed of the simulation RNG.
    pub seed: u64,
}

impl SimConfig {
    pub fn with_rate(rate: SimRate) -> Self {
        Self {
            fixed_timestep: 1.0 / rate.hz(),
            ..Default::default()
        }
    }

    /// Rejects values the tick loops cannot run with.
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.fixed_timestep.is_finite() && self.fixed_timestep > 0.0) {
            return Err(SimError::InvalidConfig("fixed_timestep must be positive and finite"));
        }
        if !(self.despawn_time.is_finite() && self.despawn_time >= 0.0) {
            return Err(SimError::InvalidConfig("despawn_time must be non-negative and finite"));
        }
        if !(self.flight_envelope_radius.is_finite() && self.flight_envelope_radius >= 0.0) {
            return Err(SimError::InvalidConfig(
                "flight_envelope_radius must be non-negative and finite",
            ));
        }
        if !(self.jitter_deviation.is_finite() && self.flight_envelope_center.is_finite()) {
            return Err(SimError::NonFiniteInput);
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            despawn_time: 7.0,
            jitter_deviation: crate::targeting::JITTER_DEVIATION,
            flight_envelope_center: Vec2::ZERO,
            flight_envelope_radius: 30_000.0,
            seed: 0x5EED,
        }
    }
}

/// Global physics tick counter.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// Seeded RNG shared by every randomized decision (jitter, sound pitch).
#[derive(Resource, Debug, Clone)]
pub struct SimRng(pub ChaCha8Rng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::seeded(SimConfig::default().seed)
    }
}
