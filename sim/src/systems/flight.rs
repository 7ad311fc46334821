//! Flight systems - turn intent into forces and integrate them.
//!
//! Runs on the fixed physics tick. Order matters: forces are accumulated by
//! `flight_control_system` and `gravity_system`, consumed by
//! `integration_system`.

use crate::components::*;
use crate::gravity::GravityResource;
use crate::thrust::{allocate_one, thruster_force};
use bevy_ecs::prelude::*;

/// Resource containing the delta time for the current tick.
#[derive(Resource, Default)]
pub struct DeltaTime(pub f32);

/// PID heading loop plus thrust allocation for every craft.
///
/// The PID runs for wrecks too; their allocation ignores the result and
/// keeps stuck thrusters at full force.
pub fn flight_control_system(
    dt: Res<DeltaTime>,
    mut query: Query<(
        &Rotation,
        &Hull,
        &mut FlightControl,
        &mut Thrusters,
        &mut ForceAccumulator,
    )>,
) {
    for (rotation, hull, mut flight, mut thrusters, mut forces) in query.iter_mut() {
        let destroyed = hull.is_destroyed();
        let offset = flight.turn_offset;
        let turn = flight.pid.compute(offset, dt.0);
        flight.last_turn_command = turn;
        let effort = flight.effort();

        for thruster in thrusters.0.iter_mut() {
            let command = allocate_one(thruster, effort, turn, destroyed);
            if !destroyed {
                thruster.enabled = command.enabled;
            }
            if command.enabled {
                let (force, torque) = thruster_force(thruster, command.force_factor, rotation.0);
                forces.add_force_and_torque(force, torque);
            }
        }
    }
}

/// Adds the gravity field's pull to every craft, wrecked or not.
pub fn gravity_system(
    gravity: Res<GravityResource>,
    mut query: Query<(&Position, &mut ForceAccumulator), With<Hull>>,
) {
    for (pos, mut forces) in query.iter_mut() {
        forces.add_force(gravity.0.force_at(pos.vec()));
    }
}

/// Semi-implicit Euler step, then clears the accumulator.
pub fn integration_system(
    dt: Res<DeltaTime>,
    mut query: Query<(
        &RigidBody,
        &mut ForceAccumulator,
        &mut Velocity,
        &mut AngularVelocity,
        &mut Position,
        &mut Rotation,
    )>,
) {
    let delta = dt.0;
    for (body, mut forces, mut vel, mut ang_vel, mut pos, mut rot) in query.iter_mut() {
        vel.vx += forces.force.x / body.mass * delta;
        vel.vy += forces.force.y / body.mass * delta;
        ang_vel.0 += forces.torque / body.inertia * delta;

        pos.x += vel.vx * delta;
        pos.y += vel.vy * delta;
        rot.0 += ang_vel.0 * delta;

        forces.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gravity::{GravityField, PointGravityField};
    use crate::math::Vec2;
    use crate::spacecraft::SpacecraftTemplate;
    use approx::assert_abs_diff_eq;

    fn world_with(dt: f32) -> World {
        let mut world = World::new();
        world.insert_resource(DeltaTime(dt));
        world.insert_resource(GravityResource::default());
        world
    }

    fn spawn_fighter(world: &mut World) -> Entity {
        let bundle = SpacecraftTemplate::fighter()
            .bundle(CraftId(1), Vec2::ZERO, 0.0)
            .unwrap();
        world.spawn(bundle).id()
    }

    fn physics() -> Schedule {
        let mut schedule = Schedule::default();
        schedule.add_systems((flight_control_system, gravity_system, integration_system).chain());
        schedule
    }

    #[test]
    fn test_full_forward_accelerates_along_heading() {
        let mut world = world_with(1.0 / 60.0);
        let craft = spawn_fighter(&mut world);
        world
            .get_mut::<FlightControl>(craft)
            .unwrap()
            .set_effort(Vec2::new(0.0, -1.0))
            .unwrap();

        let mut schedule = physics();
        for _ in 0..30 {
            schedule.run(&mut world);
        }

        let vel = world.get::<Velocity>(craft).unwrap();
        assert!(vel.vy < 0.0, "forward is -Y");
        assert_abs_diff_eq!(vel.vx, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(world.get::<AngularVelocity>(craft).unwrap().0, 0.0, epsilon = 1e-4);
        let thrusters = world.get::<Thrusters>(craft).unwrap();
        assert_eq!(thrusters.enabled_count(), 2);
    }

    #[test]
    fn test_target_on_right_turns_clockwise() {
        let mut world = world_with(1.0 / 60.0);
        let craft = spawn_fighter(&mut world);
        // Negative steering error: the desired direction lies to the right.
        world.get_mut::<FlightControl>(craft).unwrap().turn_offset = -0.5;

        let mut schedule = physics();
        schedule.run(&mut world);

        let flight = world.get::<FlightControl>(craft).unwrap();
        assert!(flight.last_turn_command > 0.0);
        assert!(world.get::<AngularVelocity>(craft).unwrap().0 > 0.0);
        // Turning pairs cancel laterally.
        assert_abs_diff_eq!(world.get::<Velocity>(craft).unwrap().vx, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_wreck_keeps_burning_locked_thrusters() {
        let mut world = world_with(1.0 / 60.0);
        let craft = spawn_fighter(&mut world);
        world
            .get_mut::<FlightControl>(craft)
            .unwrap()
            .set_effort(Vec2::new(0.0, -1.0))
            .unwrap();

        let mut schedule = physics();
        schedule.run(&mut world);

        {
            let mut entity = world.entity_mut(craft);
            entity.get_mut::<Hull>().unwrap().destroy(7.0);
            entity.get_mut::<Thrusters>().unwrap().lock_for_wreck();
            // Intent changes are ignored from now on.
            entity
                .get_mut::<FlightControl>()
                .unwrap()
                .set_effort(Vec2::new(0.0, 1.0))
                .unwrap();
        }

        let before = world.get::<Velocity>(craft).unwrap().vy;
        for _ in 0..10 {
            schedule.run(&mut world);
        }
        let after = world.get::<Velocity>(craft).unwrap().vy;
        assert!(after < before, "wreck still accelerating forward");
        let thrusters = world.get::<Thrusters>(craft).unwrap();
        assert!(thrusters.0.iter().all(|t| !t.enabled));
        assert_eq!(thrusters.enabled_count(), 2);
    }

    #[test]
    fn test_gravity_applies_to_wrecks() {
        let mut world = world_with(0.5);
        let mut field = PointGravityField::new(1.0);
        field.register_source(Vec2::new(0.0, 100.0), 1.0e5);
        world.insert_resource(GravityResource(Box::new(field)));

        let craft = spawn_fighter(&mut world);
        world.get_mut::<Hull>(craft).unwrap().destroy(7.0);

        let mut schedule = physics();
        schedule.run(&mut world);

        // 1e5 / 100^2 = 10 force on 10 mass for 0.5 s.
        let vel = world.get::<Velocity>(craft).unwrap();
        assert_abs_diff_eq!(vel.vy, 0.5, epsilon = 1e-4);
        let forces = world.get::<ForceAccumulator>(craft).unwrap();
        assert_eq!(forces.force, Vec2::ZERO, "accumulator cleared after integration");
    }
}
