//! Player control - applies host input to the player craft.

use crate::components::*;
use crate::events::{SimEvent, SimEventBuffer};
use crate::math::Vec2;
use crate::spacecraft::fire_weapons;
use crate::targeting::{direction_to, steering_error};
use bevy_ecs::prelude::*;
use log::{info, warn};

/// Latest input sampled by the host.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInput {
    /// Raw movement axes; clamped to [-1, 1] when applied.
    pub movement: Vec2,
    /// World point the player aims at. `None` leaves the heading alone.
    pub aim_point: Option<Vec2>,
    pub fire: bool,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerState {
    pub craft: Option<Entity>,
    /// Set once `PlayerDestroyed` has been emitted.
    pub destroyed_reported: bool,
}

pub fn player_control_system(
    input: Res<PlayerInput>,
    mut state: ResMut<PlayerState>,
    mut events: ResMut<SimEventBuffer>,
    mut query: Query<
        (
            &CraftId,
            &Position,
            &Rotation,
            &Hull,
            &mut FlightControl,
            &mut Armament,
        ),
        With<PlayerControlled>,
    >,
) {
    let Some(entity) = state.craft else {
        return;
    };

    let Ok((id, pos, rot, hull, mut flight, mut armament)) = query.get_mut(entity) else {
        if !state.destroyed_reported {
            info!("player craft is gone");
            events.push(SimEvent::PlayerDestroyed);
            state.destroyed_reported = true;
        }
        return;
    };

    let movement = Vec2::new(
        input.movement.x.clamp(-1.0, 1.0),
        input.movement.y.clamp(-1.0, 1.0),
    );
    if let Err(err) = flight.set_effort(movement) {
        warn!("player input ignored: {err}");
    }

    flight.turn_offset = match input.aim_point {
        Some(aim) => steering_error(pos.vec(), rot.0, direction_to(pos.vec(), aim)),
        None => 0.0,
    };

    if input.fire {
        fire_weapons(*id, pos, rot, hull, &mut armament, 0, &mut events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spacecraft::SpacecraftTemplate;
    use approx::assert_abs_diff_eq;

    fn setup() -> (World, Entity) {
        let mut world = World::new();
        world.insert_resource(PlayerInput::default());
        world.insert_resource(SimEventBuffer::default());
        let craft = world
            .spawn((
                SpacecraftTemplate::fighter()
                    .bundle(CraftId(0), Vec2::ZERO, 0.0)
                    .unwrap(),
                PlayerControlled,
            ))
            .id();
        world.insert_resource(PlayerState {
            craft: Some(craft),
            destroyed_reported: false,
        });
        (world, craft)
    }

    fn schedule() -> Schedule {
        let mut schedule = Schedule::default();
        schedule.add_systems(player_control_system);
        schedule
    }

    #[test]
    fn test_input_is_clamped_and_aimed_without_jitter() {
        let (mut world, craft) = setup();
        world.insert_resource(PlayerInput {
            movement: Vec2::new(3.0, -2.0),
            aim_point: Some(Vec2::new(100.0, 0.0)),
            fire: true,
        });
        schedule().run(&mut world);

        let flight = world.get::<FlightControl>(craft).unwrap();
        assert_eq!(flight.effort(), Vec2::new(1.0, -1.0));
        // Target straight to the right of a craft facing up.
        assert_abs_diff_eq!(flight.turn_offset, -1.0, epsilon = 1e-6);
        let events = world.resource::<SimEventBuffer>();
        assert_eq!(events.count_where(|e| matches!(e, SimEvent::WeaponFired { .. })), 2);
    }

    #[test]
    fn test_player_destroyed_reported_once() {
        let (mut world, craft) = setup();
        world.despawn(craft);
        let mut schedule = schedule();
        for _ in 0..3 {
            schedule.run(&mut world);
        }
        let events = world.resource::<SimEventBuffer>();
        assert_eq!(events.count_where(|e| matches!(e, SimEvent::PlayerDestroyed)), 1);
    }

    #[test]
    fn test_wrecked_player_is_not_reported() {
        let (mut world, craft) = setup();
        world.get_mut::<Hull>(craft).unwrap().destroy(7.0);
        schedule().run(&mut world);
        assert!(world.resource::<SimEventBuffer>().is_empty());
    }
}
