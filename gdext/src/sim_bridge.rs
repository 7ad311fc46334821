//! `SpacecraftSimulation` - Godot class that owns a `SimWorld`.
//!
//! Scenes push commands in (damage, weapon fire, player input), call
//! `step(delta)` every frame, then read state back through the flat
//! snapshot buffer and play effects from the drained event batch.
//!
//! See `sim/src/godot_bridge.rs` for the buffer format.

use godot::builtin::PackedFloat32Array;
use godot::prelude::*;
use override_sim::config::{SimConfig, SimRate};
use override_sim::godot_bridge::{snapshot_to_flatbuffer, CRAFT_STRIDE, HEADER_SIZE};
use override_sim::systems::events_to_json_string;
use override_sim::{CraftId, DamageOutcome, PlayerInput, SimError, SimWorld, Vec2};

/// Returned by id-producing calls when the simulation refused the request.
const INVALID_ID: i64 = -1;

fn to_vec2(v: Vector2) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn craft_id(id: i64) -> Option<CraftId> {
    u32::try_from(id).ok().map(CraftId)
}

fn report(context: &str, error: SimError) {
    godot_warn!("[SpacecraftSimulation] {context}: {error}");
}

/// Spacecraft simulation running at a fixed 60 Hz.
///
/// ## Usage in GDScript
///
/// ```gdscript
/// var sim := SpacecraftSimulation.new()
/// var player := sim.spawn_player_craft(Vector2.ZERO, 0.0)
/// sim.set_swarm_target(player)
///
/// func _physics_process(delta):
///     sim.set_player_input(input_vector, get_global_mouse_position(), true, firing)
///     sim.step(delta)
///     var buffer := sim.get_snapshot_buffer()
///     for event in JSON.parse_string(sim.drain_events_json()):
///         play_effect(event)
/// ```
#[derive(GodotClass)]
#[class(base=RefCounted)]
pub struct SpacecraftSimulation {
    base: Base<RefCounted>,
    sim: SimWorld,
}

#[godot_api]
impl IRefCounted for SpacecraftSimulation {
    fn init(base: Base<RefCounted>) -> Self {
        let sim = SimWorld::with_config(SimConfig::with_rate(SimRate::Smooth60Hz))
            .unwrap_or_else(|e| {
                report("init", e);
                SimWorld::new()
            });
        Self { base, sim }
    }
}

#[godot_api]
impl SpacecraftSimulation {
    // ========================================================================
    // SIMULATION CONTROL
    // ========================================================================

    /// Advance by `delta` seconds. Physics runs at the fixed rate internally.
    #[func]
    fn step(&mut self, delta: f64) {
        self.sim.step(delta as f32);
    }

    #[func]
    fn get_tick(&self) -> i64 {
        self.sim.current_tick() as i64
    }

    #[func]
    fn get_time(&self) -> f64 {
        self.sim.current_time() as f64
    }

    // ========================================================================
    // SPAWNING
    // ========================================================================

    /// Spawn the player craft. Returns its id, or -1.
    #[func]
    fn spawn_player_craft(&mut self, position: Vector2, rotation: f32) -> i64 {
        match self.sim.spawn_player_craft(to_vec2(position), rotation) {
            Ok(id) => {
                godot_print!("[SpacecraftSimulation] player craft {} spawned", id.0);
                id.0 as i64
            }
            Err(e) => {
                report("spawn_player_craft", e);
                INVALID_ID
            }
        }
    }

    /// Spawn a craft that nobody controls yet. Returns its id, or -1.
    #[func]
    fn spawn_craft(&mut self, position: Vector2, rotation: f32) -> i64 {
        match self.sim.spawn_craft(to_vec2(position), rotation) {
            Ok(id) => id.0 as i64,
            Err(e) => {
                report("spawn_craft", e);
                INVALID_ID
            }
        }
    }

    /// Hand a spawned craft to the swarm.
    #[func]
    fn add_spacecraft(&mut self, id: i64) -> bool {
        let Some(id) = craft_id(id) else {
            return false;
        };
        match self.sim.add_spacecraft(id) {
            Ok(()) => true,
            Err(e) => {
                report("add_spacecraft", e);
                false
            }
        }
    }

    #[func]
    fn spawn_planet(
        &mut self,
        name: GString,
        orbit_center: Vector2,
        orbit_radius: f32,
        orbit_frequency: f32,
        gravity_strength: f32,
    ) {
        self.sim.spawn_planet(
            &name.to_string(),
            to_vec2(orbit_center),
            orbit_radius,
            orbit_frequency,
            gravity_strength,
        );
    }

    // ========================================================================
    // SPACECRAFT COMMANDS
    // ========================================================================

    /// Apply a hit. Returns 0 = damaged, 1 = destroyed by this hit,
    /// 2 = already a wreck, -1 = rejected.
    #[func]
    fn take_damage(&mut self, id: i64, amount: i32) -> i32 {
        let Some(id) = craft_id(id) else {
            return -1;
        };
        match self.sim.take_damage(id, amount) {
            Ok(DamageOutcome::Damaged) => 0,
            Ok(DamageOutcome::Destroyed) => 1,
            Ok(DamageOutcome::AlreadyDestroyed) => 2,
            Err(e) => {
                report("take_damage", e);
                -1
            }
        }
    }

    /// Fire every ready weapon of a group. Returns the number of shots.
    #[func]
    fn fire_weapons(&mut self, id: i64, group_index: i32) -> i32 {
        let (Some(id), Ok(group)) = (craft_id(id), u32::try_from(group_index)) else {
            return 0;
        };
        match self.sim.fire_weapons(id, group) {
            Ok(shots) => shots as i32,
            Err(e) => {
                report("fire_weapons", e);
                0
            }
        }
    }

    #[func]
    fn set_movement_effort(&mut self, id: i64, effort: Vector2) -> bool {
        let Some(id) = craft_id(id) else {
            return false;
        };
        match self.sim.set_target_movement_effort(id, to_vec2(effort)) {
            Ok(()) => true,
            Err(e) => {
                report("set_movement_effort", e);
                false
            }
        }
    }

    #[func]
    fn set_turn_offset(&mut self, id: i64, offset: f32) -> bool {
        let Some(id) = craft_id(id) else {
            return false;
        };
        match self.sim.set_turn_process_offset(id, offset) {
            Ok(()) => true,
            Err(e) => {
                report("set_turn_offset", e);
                false
            }
        }
    }

    #[func]
    fn switch_collision_layer(&mut self, id: i64, layer: i32) -> bool {
        let (Some(id), Ok(layer)) = (craft_id(id), u32::try_from(layer)) else {
            return false;
        };
        match self.sim.switch_collision_layer(id, layer) {
            Ok(()) => true,
            Err(e) => {
                report("switch_collision_layer", e);
                false
            }
        }
    }

    /// True for wrecks. Unknown ids report false.
    #[func]
    fn is_destroyed(&self, id: i64) -> bool {
        craft_id(id)
            .and_then(|id| self.sim.is_destroyed(id).ok())
            .unwrap_or(false)
    }

    /// Wreck a craft without damage. Returns false if it already was one.
    #[func]
    fn destroy_spacecraft(&mut self, id: i64) -> bool {
        let Some(id) = craft_id(id) else {
            return false;
        };
        match self.sim.destroy_spacecraft(id) {
            Ok(changed) => changed,
            Err(e) => {
                report("destroy_spacecraft", e);
                false
            }
        }
    }

    // ========================================================================
    // SWARM / PLAYER
    // ========================================================================

    /// Point the swarm at a craft. A negative id clears the target.
    #[func]
    fn set_swarm_target(&mut self, id: i64) -> bool {
        let target = if id < 0 { None } else { craft_id(id) };
        match self.sim.set_swarm_target(target) {
            Ok(()) => true,
            Err(e) => {
                report("set_swarm_target", e);
                false
            }
        }
    }

    #[func]
    fn set_player_input(&mut self, movement: Vector2, aim_point: Vector2, has_aim: bool, fire: bool) {
        self.sim.set_player_input(PlayerInput {
            movement: to_vec2(movement),
            aim_point: has_aim.then(|| to_vec2(aim_point)),
            fire,
        });
    }

    #[func]
    fn spaceship_count(&self) -> i32 {
        self.sim.spaceship_count() as i32
    }

    // ========================================================================
    // SNAPSHOT / EVENTS
    // ========================================================================

    /// Flat snapshot buffer; `CRAFT_STRIDE` floats per craft after the header.
    #[func]
    fn get_snapshot_buffer(&mut self) -> PackedFloat32Array {
        let buffer = snapshot_to_flatbuffer(&self.sim.snapshot());
        PackedFloat32Array::from(buffer.as_slice())
    }

    #[func]
    fn get_snapshot_json(&mut self) -> GString {
        GString::from(self.sim.snapshot_json().as_str())
    }

    /// Events since the last call, as a JSON array.
    #[func]
    fn drain_events_json(&mut self) -> GString {
        let events = self.sim.drain_events();
        match events_to_json_string(&events) {
            Ok(json) => GString::from(json.as_str()),
            Err(e) => {
                godot_error!("[SpacecraftSimulation] event serialization failed: {e}");
                GString::from("[]")
            }
        }
    }

    #[func]
    fn get_craft_stride(&self) -> i32 {
        CRAFT_STRIDE as i32
    }

    #[func]
    fn get_header_size(&self) -> i32 {
        HEADER_SIZE as i32
    }
}
