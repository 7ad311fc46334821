//! Godot Integration Bridge
//!
//! Converts snapshots into a flat `f32` buffer that crosses the GDExtension
//! boundary as a `PackedFloat32Array` without per-craft allocations.
//!
//! # Buffer Layout (Version 1.0)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │ HEADER (1 element)                                              │
//! │ [0] craft_count (as f32)                                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ For each craft i (offset = 1 + i * CRAFT_STRIDE):               │
//! │   [+0]  id                - Craft ID (u32 as f32)               │
//! │   [+1]  x                 - X position (world units)            │
//! │   [+2]  y                 - Y position (world units, +Y down)   │
//! │   [+3]  rotation          - Radians, 0 = facing -Y              │
//! │   [+4]  vx                - X velocity (units/sec)              │
//! │   [+5]  vy                - Y velocity (units/sec)              │
//! │   [+6]  health            - Current hull                        │
//! │   [+7]  max_health        - Maximum hull                        │
//! │   [+8]  is_destroyed      - 1.0 = wreck, 0.0 = intact           │
//! │   [+9]  is_ai             - 1.0 = swarm craft                   │
//! │   [+10] enabled_thrusters - Thrusters producing force           │
//! │   [+11] turn_command      - Last PID output in [-1, 1]          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage from Godot (GDScript)
//!
//! ```gdscript
//! const CRAFT_STRIDE = 12
//! const HEADER_SIZE = 1
//!
//! func parse_snapshot(buffer: PackedFloat32Array):
//!     var craft_count = int(buffer[0])
//!     for i in range(craft_count):
//!         var offset = HEADER_SIZE + i * CRAFT_STRIDE
//!         var id = int(buffer[offset + 0])
//!         var pos = Vector2(buffer[offset + 1], buffer[offset + 2])
//!         var wrecked = buffer[offset + 8] > 0.5
//! ```
//!
//! Crafts are written in snapshot order (sorted by id), so the buffer is
//! deterministic for a given snapshot.

use crate::world::Snapshot;

// ============================================================================
// CONSTANTS - STABLE FFI CONTRACT
// ============================================================================

/// Number of f32 values per craft.
pub const CRAFT_STRIDE: usize = 12;

/// Number of f32 values in the header (craft_count).
pub const HEADER_SIZE: usize = 1;

pub const FIELD_ID: usize = 0;
pub const FIELD_X: usize = 1;
pub const FIELD_Y: usize = 2;
pub const FIELD_ROTATION: usize = 3;
pub const FIELD_VX: usize = 4;
pub const FIELD_VY: usize = 5;
pub const FIELD_HEALTH: usize = 6;
pub const FIELD_MAX_HEALTH: usize = 7;
pub const FIELD_IS_DESTROYED: usize = 8;
pub const FIELD_IS_AI: usize = 9;
pub const FIELD_ENABLED_THRUSTERS: usize = 10;
pub const FIELD_TURN_COMMAND: usize = 11;

#[inline]
fn flag(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}

// ============================================================================
// SERIALIZATION
// ============================================================================

/// Convert a snapshot to the flat buffer described in the module docs.
pub fn snapshot_to_flatbuffer(snapshot: &Snapshot) -> Vec<f32> {
    let craft_count = snapshot.crafts.len();
    let buffer_size = calculate_buffer_size(craft_count);
    let mut buffer = Vec::with_capacity(buffer_size);

    buffer.push(craft_count as f32);

    for craft in &snapshot.crafts {
        buffer.push(craft.id as f32);
        buffer.push(craft.x);
        buffer.push(craft.y);
        buffer.push(craft.rotation);
        buffer.push(craft.vx);
        buffer.push(craft.vy);
        buffer.push(craft.health as f32);
        buffer.push(craft.max_health as f32);
        buffer.push(flag(craft.is_destroyed));
        buffer.push(flag(craft.is_ai));
        buffer.push(craft.enabled_thrusters as f32);
        buffer.push(craft.turn_command);
    }

    debug_assert_eq!(buffer.len(), buffer_size, "Buffer size mismatch");
    buffer
}

#[inline]
pub fn calculate_buffer_size(craft_count: usize) -> usize {
    HEADER_SIZE + craft_count * CRAFT_STRIDE
}

/// Craft count from the header, `None` for an empty buffer.
#[inline]
pub fn parse_craft_count(buffer: &[f32]) -> Option<usize> {
    buffer.first().map(|&count| count as usize)
}

/// Buffer offset of the craft at `craft_index`.
#[inline]
pub const fn craft_offset(craft_index: usize) -> usize {
    HEADER_SIZE + craft_index * CRAFT_STRIDE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SimWorld;
    use crate::math::Vec2;

    #[test]
    fn test_empty_world_is_header_only() {
        let mut sim = SimWorld::new();
        let buffer = snapshot_to_flatbuffer(&sim.snapshot());
        assert_eq!(buffer, vec![0.0]);
    }

    #[test]
    fn test_craft_fields_at_offsets() {
        let mut sim = SimWorld::new();
        let player = sim.spawn_player_craft(Vec2::new(10.0, 20.0), 0.0).unwrap();
        let ai = sim.spawn_craft(Vec2::new(-30.0, 5.0), 0.0).unwrap();
        sim.add_spacecraft(ai).unwrap();
        sim.take_damage(ai, 100).unwrap();

        let buffer = snapshot_to_flatbuffer(&sim.snapshot());
        assert_eq!(parse_craft_count(&buffer), Some(2));
        assert_eq!(buffer.len(), calculate_buffer_size(2));

        let first = craft_offset(0);
        assert_eq!(buffer[first + FIELD_ID], player.0 as f32);
        assert_eq!(buffer[first + FIELD_X], 10.0);
        assert_eq!(buffer[first + FIELD_Y], 20.0);
        assert_eq!(buffer[first + FIELD_IS_AI], 0.0);
        assert_eq!(buffer[first + FIELD_MAX_HEALTH], 100.0);

        let second = craft_offset(1);
        assert_eq!(buffer[second + FIELD_ID], ai.0 as f32);
        assert_eq!(buffer[second + FIELD_IS_AI], 1.0);
        assert_eq!(buffer[second + FIELD_IS_DESTROYED], 1.0);
        assert_eq!(buffer[second + FIELD_HEALTH], 0.0);
    }

    #[test]
    fn test_determinism() {
        let build = || {
            let mut sim = SimWorld::new();
            sim.spawn_player_craft(Vec2::ZERO, 0.0).unwrap();
            for i in 0..4 {
                let id = sim.spawn_craft(Vec2::new(200.0 * i as f32, -300.0), 0.0).unwrap();
                sim.add_spacecraft(id).unwrap();
            }
            sim.set_swarm_target_player();
            for _ in 0..20 {
                sim.step(1.0 / 60.0);
            }
            snapshot_to_flatbuffer(&sim.snapshot())
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_parse_and_offsets() {
        assert_eq!(parse_craft_count(&[]), None);
        assert_eq!(parse_craft_count(&[3.0]), Some(3));
        assert_eq!(craft_offset(0), HEADER_SIZE);
        assert_eq!(craft_offset(10), HEADER_SIZE + 10 * CRAFT_STRIDE);
        assert_eq!(CRAFT_STRIDE, FIELD_TURN_COMMAND + 1);
    }
}
