//! Snapshot types.
//!
//! The `Snapshot` struct provides a serializable view of the simulation state
//! that can be sent to Godot for visualization.

use crate::components::*;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Snapshot of a single spacecraft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CraftSnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub vx: f32,
    pub vy: f32,
    pub health: i32,
    pub max_health: i32,
    pub is_destroyed: bool,
    pub is_ai: bool,
    pub is_player: bool,
    /// Thrusters currently producing force (stuck ones included).
    pub enabled_thrusters: u32,
    pub turn_command: f32,
    pub collision_layer: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanetSnapshot {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub orbit_angle: f32,
}

/// Complete simulation state snapshot for Godot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Physics ticks run so far.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub time: f32,
    /// Crafts, sorted by id.
    pub crafts: Vec<CraftSnapshot>,
    pub planets: Vec<PlanetSnapshot>,
}

impl Snapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(world: &mut World, tick: u64, time: f32) -> Self {
        let mut crafts = Vec::new();

        let mut query = world.query::<(
            &CraftId,
            &Position,
            &Rotation,
            &Velocity,
            &Hull,
            &Thrusters,
            &FlightControl,
            &CollisionLayers,
            Has<AiControlled>,
            Has<PlayerControlled>,
        )>();

        for (id, pos, rot, vel, hull, thrusters, flight, layers, is_ai, is_player) in query.iter(world) {
            crafts.push(CraftSnapshot {
                id: id.0,
                x: pos.x,
                y: pos.y,
                rotation: rot.0,
                vx: vel.vx,
                vy: vel.vy,
                health: hull.health,
                max_health: hull.max_health,
                is_destroyed: hull.is_destroyed(),
                is_ai,
                is_player,
                enabled_thrusters: thrusters.enabled_count() as u32,
                turn_command: flight.last_turn_command,
                collision_layer: layers.layer,
            });
        }
        // Entity iteration order is not stable across archetype moves.
        crafts.sort_by_key(|c| c.id);

        let mut planets = Vec::new();
        let mut planet_query = world.query::<(&Planet, &Position)>();
        for (planet, pos) in planet_query.iter(world) {
            planets.push(PlanetSnapshot {
                name: planet.name.clone(),
                x: pos.x,
                y: pos.y,
                orbit_angle: planet.orbit_angle,
            });
        }

        Self {
            tick,
            time,
            crafts,
            planets,
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn craft(&self, id: u32) -> Option<&CraftSnapshot> {
        self.crafts.iter().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::spacecraft::SpacecraftTemplate;

    #[test]
    fn test_snapshot_lists_crafts_in_id_order() {
        let mut world = World::new();
        for id in [5u32, 2, 9] {
            let bundle = SpacecraftTemplate::fighter()
                .bundle(CraftId(id), Vec2::new(id as f32, 0.0), 0.0)
                .unwrap();
            if id == 2 {
                world.spawn((bundle, AiBundle::default()));
            } else {
                world.spawn(bundle);
            }
        }

        let snapshot = Snapshot::from_world(&mut world, 3, 0.05);
        let ids: Vec<u32> = snapshot.crafts.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
        assert!(snapshot.craft(2).unwrap().is_ai);
        assert!(!snapshot.craft(5).unwrap().is_ai);
        assert_eq!(snapshot.craft(9).unwrap().health, 100);
        assert!(snapshot.to_json().unwrap().contains("\"crafts\""));
    }
}
