//! Notifications produced by the simulation for the host.
//!
//! Systems push into [`SimEventBuffer`]; the host drains it once per frame
//! and forwards each event to whatever plays sounds, spawns particles or
//! shakes the camera.

use crate::components::CraftId;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplosionStage {
    /// The craft was just wrecked and keeps drifting.
    Wrecked,
    /// The wreck is being removed from the world.
    Despawned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlowMotionKind {
    /// A swarm craft left the roster.
    Soft,
    /// The player craft was hit.
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Hull hit. Fired for wrecks too.
    ImpactSound { craft: CraftId, pitch: f32 },
    ScreenShakeRequested { craft: CraftId, factor: f32 },
    DamageTaken { craft: CraftId, health: i32 },
    Explosion { craft: CraftId, x: f32, y: f32, stage: ExplosionStage },
    /// Final teardown. Emitted exactly once per craft.
    CraftTornDown { craft: CraftId },
    WeaponFired {
        craft: CraftId,
        weapon: usize,
        x: f32,
        y: f32,
        dir_x: f32,
        dir_y: f32,
        collision_layer: u32,
    },
    /// A craft left the swarm roster.
    RemovalSound { pitch: f32 },
    SlowMotion { kind: SlowMotionKind },
    CraftRemoved { craft: CraftId },
    PlayerDestroyed,
}

/// Events accumulated since the host last drained them.
#[derive(Resource, Debug, Default)]
pub struct SimEventBuffer {
    pub events: Vec<SimEvent>,
}

impl SimEventBuffer {
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn count_where(&self, pred: impl Fn(&SimEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}
