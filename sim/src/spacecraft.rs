//! Spacecraft construction and the state transitions shared by the tick
//! systems and the public API: taking hits, wrecking, firing and switching
//! collision layers.

use crate::components::*;
use crate::error::SimError;
use crate::events::{ExplosionStage, SimEvent, SimEventBuffer};
use crate::math::{forward, Vec2};
use crate::thrust::Thruster;
use log::{debug, info};
use rand::Rng;

/// Screen shake requested whenever a live craft is hit.
pub const HIT_SCREEN_SHAKE: f32 = 14.0;
/// Impact sound pitch range.
pub const IMPACT_PITCH_MIN: f32 = 0.9;
pub const IMPACT_PITCH_MAX: f32 = 1.2;

/// Blueprint a craft is built from. Thruster and weapon sets are copied
/// into the craft and never change afterwards.
#[derive(Debug, Clone)]
pub struct SpacecraftTemplate {
    pub max_health: i32,
    pub mass: f32,
    pub inertia: f32,
    pub thrusters: Vec<Thruster>,
    pub weapons: Vec<Weapon>,
}

impl SpacecraftTemplate {
    /// Standard fighter: 100 hull, seven thrusters, two primary guns.
    pub fn fighter() -> Self {
        Self {
            max_health: 100,
            mass: 10.0,
            inertia: 400.0,
            thrusters: Thrusters::fighter_layout().0,
            weapons: vec![
                Weapon::new(WeaponGroup::Primary, 0.2, Vec2::new(-6.0, -8.0)),
                Weapon::new(WeaponGroup::Primary, 0.2, Vec2::new(6.0, -8.0)),
            ],
        }
    }

    pub fn with_max_health(mut self, max_health: i32) -> Self {
        self.max_health = max_health;
        self
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.thrusters.is_empty() {
            return Err(SimError::NoThrusters);
        }
        if self.max_health <= 0 {
            return Err(SimError::InvalidTemplate("max_health must be positive"));
        }
        if !(self.mass > 0.0 && self.mass.is_finite()) {
            return Err(SimError::InvalidTemplate("mass must be positive"));
        }
        if !(self.inertia > 0.0 && self.inertia.is_finite()) {
            return Err(SimError::InvalidTemplate("inertia must be positive"));
        }
        Ok(())
    }

    /// Components for a fresh craft: full health, a new PID, thrusters off.
    pub fn bundle(&self, id: CraftId, position: Vec2, rotation: f32) -> Result<SpacecraftBundle, SimError> {
        self.validate()?;
        if !position.is_finite() || !rotation.is_finite() {
            return Err(SimError::NonFiniteInput);
        }
        Ok(SpacecraftBundle {
            id,
            position: position.into(),
            rotation: Rotation(rotation),
            body: RigidBody {
                mass: self.mass,
                inertia: self.inertia,
            },
            hull: Hull::new(self.max_health),
            thrusters: Thrusters(self.thrusters.clone()),
            armament: Armament(self.weapons.clone()),
            ..Default::default()
        })
    }
}

impl Default for SpacecraftTemplate {
    fn default() -> Self {
        Self::fighter()
    }
}

/// Wreck the craft: lock its thrusters, start the despawn countdown and
/// announce the explosion. Returns false if it was already a wreck.
pub fn enter_destroyed(
    id: CraftId,
    position: &Position,
    hull: &mut Hull,
    thrusters: &mut Thrusters,
    despawn_time: f32,
    events: &mut SimEventBuffer,
) -> bool {
    if !hull.destroy(despawn_time) {
        return false;
    }
    thrusters.lock_for_wreck();
    events.push(SimEvent::Explosion {
        craft: id,
        x: position.x,
        y: position.y,
        stage: ExplosionStage::Wrecked,
    });
    info!(
        "craft {} destroyed at ({:.0}, {:.0}), despawn in {:.1}s",
        id.0, position.x, position.y, despawn_time
    );
    true
}

/// Everything a hit does to a craft, side effects included.
pub struct HitContext<'a, R: Rng + ?Sized> {
    pub despawn_time: f32,
    pub rng: &'a mut R,
    pub events: &'a mut SimEventBuffer,
}

pub fn take_hit<R: Rng + ?Sized>(
    id: CraftId,
    position: &Position,
    hull: &mut Hull,
    thrusters: &mut Thrusters,
    amount: i32,
    ctx: HitContext<'_, R>,
) -> Result<DamageOutcome, SimError> {
    if amount < 0 {
        return Err(SimError::NegativeDamage(amount));
    }
    let pitch = ctx.rng.gen_range(IMPACT_PITCH_MIN..=IMPACT_PITCH_MAX);
    let outcome = hull.apply_damage(amount);
    if outcome != DamageOutcome::AlreadyDestroyed {
        ctx.events.push(SimEvent::ScreenShakeRequested {
            craft: id,
            factor: HIT_SCREEN_SHAKE,
        });
    }
    ctx.events.push(SimEvent::ImpactSound { craft: id, pitch });

    match outcome {
        DamageOutcome::AlreadyDestroyed => {
            debug!("craft {} hit while wrecked", id.0);
        }
        DamageOutcome::Destroyed => {
            enter_destroyed(id, position, hull, thrusters, ctx.despawn_time, ctx.events);
            ctx.events.push(SimEvent::DamageTaken {
                craft: id,
                health: hull.health,
            });
        }
        DamageOutcome::Damaged => {
            ctx.events.push(SimEvent::DamageTaken {
                craft: id,
                health: hull.health,
            });
        }
    }
    Ok(outcome)
}

/// Fire every ready weapon of the selected group. Wrecks never fire.
/// Returns the number of shots.
pub fn fire_weapons(
    id: CraftId,
    position: &Position,
    rotation: &Rotation,
    hull: &Hull,
    armament: &mut Armament,
    group_index: u32,
    events: &mut SimEventBuffer,
) -> usize {
    if hull.is_destroyed() {
        return 0;
    }
    let Some(group) = WeaponGroup::from_index(group_index) else {
        return 0;
    };

    let dir = forward(rotation.0);
    let mut shots = 0;
    for (index, weapon) in armament.0.iter_mut().enumerate() {
        if weapon.group != group || !weapon.try_fire() {
            continue;
        }
        let muzzle = position.vec() + weapon.muzzle_offset.rotated(rotation.0);
        events.push(SimEvent::WeaponFired {
            craft: id,
            weapon: index,
            x: muzzle.x,
            y: muzzle.y,
            dir_x: dir.x,
            dir_y: dir.y,
            collision_layer: weapon.collision_layer,
        });
        shots += 1;
    }
    shots
}

/// Move a craft and all its weapons onto `layer`.
pub fn switch_collision_layer(
    layers: &mut CollisionLayers,
    armament: &mut Armament,
    layer: u32,
) -> Result<(), SimError> {
    *layers = CollisionLayers::on_layer(layer)?;
    for weapon in &mut armament.0 {
        weapon.collision_layer = layer;
    }
    Ok(())
}
