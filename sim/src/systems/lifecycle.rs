//! Lifecycle systems - weapon cooldowns, the flight envelope and wreck teardown.

use crate::components::*;
use crate::config::SimConfig;
use crate::events::{ExplosionStage, SimEvent, SimEventBuffer};
use crate::spacecraft::enter_destroyed;
use crate::systems::flight::DeltaTime;
use bevy_ecs::prelude::*;
use log::info;

pub fn weapon_cooldown_system(dt: Res<DeltaTime>, mut query: Query<&mut Armament>) {
    for mut armament in query.iter_mut() {
        for weapon in armament.0.iter_mut() {
            weapon.tick(dt.0);
        }
    }
}

/// Wrecks any live craft that strays beyond the envelope radius.
/// The craft then despawns through the normal countdown.
pub fn flight_envelope_system(
    config: Res<SimConfig>,
    mut events: ResMut<SimEventBuffer>,
    mut query: Query<(&CraftId, &Position, &mut Hull, &mut Thrusters)>,
) {
    let limit_sq = config.flight_envelope_radius * config.flight_envelope_radius;
    for (id, pos, mut hull, mut thrusters) in query.iter_mut() {
        if hull.is_destroyed() {
            continue;
        }
        if pos.vec().distance_squared(config.flight_envelope_center) > limit_sq {
            info!("craft {} left the flight envelope", id.0);
            enter_destroyed(*id, pos, &mut hull, &mut thrusters, config.despawn_time, &mut events);
        }
    }
}

/// Counts down wrecks and tears each one down exactly once.
pub fn despawn_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    mut events: ResMut<SimEventBuffer>,
    mut query: Query<(Entity, &CraftId, &Position, &mut Hull)>,
) {
    for (entity, id, pos, mut hull) in query.iter_mut() {
        if !hull.tick_despawn(dt.0) {
            continue;
        }
        events.push(SimEvent::Explosion {
            craft: *id,
            x: pos.x,
            y: pos.y,
            stage: ExplosionStage::Despawned,
        });
        events.push(SimEvent::CraftTornDown { craft: *id });
        info!("craft {} torn down", id.0);
        commands.entity(entity).despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::spacecraft::SpacecraftTemplate;

    fn setup(dt: f32) -> World {
        let mut world = World::new();
        world.insert_resource(DeltaTime(dt));
        world.insert_resource(SimConfig::default());
        world.insert_resource(SimEventBuffer::default());
        world
    }

    fn spawn_at(world: &mut World, id: u32, pos: Vec2) -> Entity {
        let bundle = SpacecraftTemplate::fighter().bundle(CraftId(id), pos, 0.0).unwrap();
        world.spawn(bundle).id()
    }

    #[test]
    fn test_envelope_wrecks_but_does_not_despawn() {
        let mut world = setup(1.0 / 60.0);
        let inside = spawn_at(&mut world, 1, Vec2::new(29_999.0, 0.0));
        let outside = spawn_at(&mut world, 2, Vec2::new(0.0, -30_001.0));

        let mut schedule = Schedule::default();
        schedule.add_systems((flight_envelope_system, despawn_system).chain());
        schedule.run(&mut world);
        schedule.run(&mut world);

        assert!(!world.get::<Hull>(inside).unwrap().is_destroyed());
        assert!(world.get::<Hull>(outside).unwrap().is_destroyed());
        let events = world.resource::<SimEventBuffer>();
        assert_eq!(events.count_where(|e| matches!(e, SimEvent::Explosion { .. })), 1);
        assert_eq!(events.count_where(|e| matches!(e, SimEvent::CraftTornDown { .. })), 0);
    }

    #[test]
    fn test_teardown_once_after_countdown() {
        let mut world = setup(0.5);
        let craft = spawn_at(&mut world, 4, Vec2::ZERO);
        world.get_mut::<Hull>(craft).unwrap().destroy(1.0);

        let mut schedule = Schedule::default();
        schedule.add_systems(despawn_system);

        schedule.run(&mut world);
        assert!(world.get::<Hull>(craft).is_some());
        schedule.run(&mut world);
        assert!(world.get::<Hull>(craft).is_none(), "entity gone");
        schedule.run(&mut world);

        let events = world.resource::<SimEventBuffer>();
        assert_eq!(events.count_where(|e| matches!(e, SimEvent::CraftTornDown { .. })), 1);
        assert_eq!(
            events.count_where(|e| matches!(e, SimEvent::Explosion { stage: ExplosionStage::Despawned, .. })),
            1
        );
    }

    #[test]
    fn test_weapon_cooldown_ticks() {
        let mut world = setup(0.15);
        let craft = spawn_at(&mut world, 1, Vec2::ZERO);
        world.get_mut::<Armament>(craft).unwrap().0[0].try_fire();

        let mut schedule = Schedule::default();
        schedule.add_systems(weapon_cooldown_system);
        schedule.run(&mut world);
        assert!(!world.get::<Armament>(craft).unwrap().0[0].is_ready());
        schedule.run(&mut world);
        assert!(world.get::<Armament>(craft).unwrap().0[0].is_ready());
    }
}
