//! Planet orbits. Each planet drags its gravity source along with it.

use crate::components::{Planet, Position};
use crate::gravity::GravityResource;
use crate::systems::flight::DeltaTime;
use bevy_ecs::prelude::*;
use std::f32::consts::TAU;

pub fn planet_orbit_system(
    dt: Res<DeltaTime>,
    mut gravity: ResMut<GravityResource>,
    mut query: Query<(&mut Planet, &mut Position)>,
) {
    for (mut planet, mut pos) in query.iter_mut() {
        // orbit_frequency is in revolutions per minute
        let step = TAU * planet.orbit_frequency * dt.0 / 60.0;
        planet.orbit_angle = (planet.orbit_angle + step).rem_euclid(TAU);
        let p = planet.orbit_position();
        *pos = p.into();
        gravity.0.move_source(planet.gravity_source, p);
    }
}
