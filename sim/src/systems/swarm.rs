//! Swarm systems - roster reconciliation and the AI decision pass.
//!
//! Both run on the decision tick, sweep first, so nothing wrecked or gone
//! is ever dispatched to.

use crate::components::*;
use crate::config::{SimConfig, SimRng};
use crate::events::{SimEvent, SimEventBuffer, SlowMotionKind};
use crate::fire_control::can_fire;
use crate::math::Vec2;
use crate::spacecraft::fire_weapons;
use crate::swarm::Swarm;
use crate::targeting::{direction_to, jittered_steering_error, random_direction};
use bevy_ecs::prelude::*;
use log::{debug, warn};
use rand::Rng;

/// Pitch range of the roster-removal sound.
pub const REMOVAL_PITCH_MIN: f32 = 0.8;
pub const REMOVAL_PITCH_MAX: f32 = 1.3;

/// Drops roster entries whose craft is wrecked or no longer exists.
pub fn roster_sweep_system(
    mut swarm: ResMut<Swarm>,
    mut rng: ResMut<SimRng>,
    mut events: ResMut<SimEventBuffer>,
    hulls: Query<&Hull>,
) {
    let removed = swarm.sweep(|entity| hulls.get(entity).is_ok_and(|hull| !hull.is_destroyed()));

    for entry in removed {
        debug!("craft {} removed from swarm", entry.craft.0);
        let pitch = rng.0.gen_range(REMOVAL_PITCH_MIN..=REMOVAL_PITCH_MAX);
        events.push(SimEvent::RemovalSound { pitch });
        events.push(SimEvent::SlowMotion {
            kind: SlowMotionKind::Soft,
        });
        events.push(SimEvent::CraftRemoved { craft: entry.craft });
    }
}

/// Aims every roster craft at the swarm target, flies it full forward and
/// fires when the gate allows.
#[allow(clippy::type_complexity)]
pub fn swarm_decision_system(
    config: Res<SimConfig>,
    swarm: Res<Swarm>,
    mut rng: ResMut<SimRng>,
    mut events: ResMut<SimEventBuffer>,
    targets: Query<&Position>,
    mut crafts: Query<
        (
            &CraftId,
            &Position,
            &Rotation,
            &Hull,
            &mut FlightControl,
            &mut Armament,
            &mut AiPilot,
        ),
        With<AiControlled>,
    >,
) {
    let target = swarm
        .target
        .and_then(|entity| targets.get(entity).ok())
        .map(|pos| pos.vec());

    for entry in swarm.roster() {
        let Ok((id, pos, rot, hull, mut flight, mut armament, mut pilot)) = crafts.get_mut(entry.entity) else {
            continue;
        };

        let here = pos.vec();
        let direction = match target {
            Some(t) => direction_to(here, t),
            None => random_direction(&mut rng.0),
        };
        let error = jittered_steering_error(here, rot.0, direction, config.jitter_deviation, &mut rng.0);

        flight.turn_offset = error;
        if let Err(err) = flight.set_effort(Vec2::UP) {
            warn!("craft {}: {err}", id.0);
        }

        let distance_squared = target.map_or(f32::INFINITY, |t| here.distance_squared(t));
        let fire = can_fire(error, distance_squared, target.is_some());
        if fire {
            fire_weapons(*id, pos, rot, hull, &mut armament, 0, &mut events);
        }

        pilot.dispatches += 1;
        pilot.last_steering_error = error;
        pilot.last_fire_allowed = fire;
    }
}
