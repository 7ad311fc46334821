//! Public API for the simulation.
//!
//! This module provides the main interface for Godot (or any other client)
//! to interact with the simulation.
//!
//! ## Ticks
//!
//! `step(dt)` runs one decision tick (targeting, roster upkeep, player
//! input) and then as many fixed physics ticks as the accumulated time
//! allows. Hosts that drive the two rates themselves call
//! `decision_tick` and `physics_tick` directly.

use crate::components::*;
use crate::config::{SimConfig, SimRng, SimTick, AI_COLLISION_LAYER, PLAYER_COLLISION_LAYER};
use crate::error::SimError;
use crate::events::{SimEvent, SimEventBuffer, SlowMotionKind};
use crate::gravity::{GravityField, GravityResource, NoGravity};
use crate::math::Vec2;
use crate::spacecraft::{self, HitContext, SpacecraftTemplate};
use crate::swarm::Swarm;
use crate::systems::*;
use crate::world::Snapshot;
use bevy_ecs::prelude::*;
use bevy_ecs::system::SystemState;
use log::{info, warn};
use std::collections::HashMap;

/// The main simulation world container.
///
/// Holds the ECS world and both schedules, providing a clean API for:
/// - Spawning craft and planets
/// - Stepping the simulation forward
/// - Issuing spacecraft commands
/// - Extracting snapshots and events
pub struct SimWorld {
    world: World,
    decision_schedule: Schedule,
    physics_schedule: Schedule,
    tick: u64,
    time: f32,
    /// Accumulated time for the fixed physics step.
    time_accumulator: f32,
    next_craft_id: u32,
    crafts: HashMap<CraftId, Entity>,
}

impl SimWorld {
    /// Create a new empty simulation world.
    pub fn new() -> Self {
        Self::build(SimConfig::default(), Box::new(NoGravity::default()))
    }

    /// Create a new simulation world with custom configuration and no gravity.
    pub fn with_config(config: SimConfig) -> Result<Self, SimError> {
        Self::with_gravity(config, NoGravity::default())
    }

    /// Create a world around an externally supplied gravity field.
    pub fn with_gravity(
        config: SimConfig,
        gravity: impl GravityField + 'static,
    ) -> Result<Self, SimError> {
        config
            .validate()
            .inspect_err(|err| warn!("config rejected: {err}"))?;
        Ok(Self::build(config, Box::new(gravity)))
    }

    fn build(config: SimConfig, gravity: Box<dyn GravityField>) -> Self {
        let mut world = World::new();

        world.insert_resource(DeltaTime(config.fixed_timestep));
        world.insert_resource(SimTick(0));
        world.insert_resource(SimRng::seeded(config.seed));
        world.insert_resource(config);
        world.insert_resource(SimEventBuffer::default());
        world.insert_resource(Swarm::default());
        world.insert_resource(PlayerState::default());
        world.insert_resource(PlayerInput::default());
        world.insert_resource(GravityResource(gravity));

        // Sweep before dispatch so no wreck is ever driven.
        let mut decision_schedule = Schedule::default();
        decision_schedule.add_systems(
            (player_control_system, roster_sweep_system, swarm_decision_system).chain(),
        );

        let mut physics_schedule = Schedule::default();
        physics_schedule.add_systems(
            (
                weapon_cooldown_system,
                flight_control_system,
                gravity_system,
                integration_system,
                planet_orbit_system,
                flight_envelope_system,
                despawn_system,
            )
                .chain(),
        );

        Self {
            world,
            decision_schedule,
            physics_schedule,
            tick: 0,
            time: 0.0,
            time_accumulator: 0.0,
            next_craft_id: 0,
            crafts: HashMap::new(),
        }
    }

    // ========================================================================
    // TICKING
    // ========================================================================

    /// Step the simulation forward by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let fixed_dt = self.world.resource::<SimConfig>().fixed_timestep;
        if !(fixed_dt.is_finite() && fixed_dt > 0.0) {
            warn!("fixed timestep {fixed_dt} is not positive, step skipped");
            return;
        }

        self.decision_tick(dt);

        self.time_accumulator += dt;
        while self.time_accumulator >= fixed_dt {
            self.physics_tick(fixed_dt);
            self.time_accumulator -= fixed_dt;
        }
    }

    /// Run the decision schedule once.
    pub fn decision_tick(&mut self, dt: f32) {
        self.world.resource_mut::<DeltaTime>().0 = dt;
        self.decision_schedule.run(&mut self.world);
    }

    /// Run the physics schedule once with the given timestep.
    pub fn physics_tick(&mut self, dt: f32) {
        self.world.resource_mut::<DeltaTime>().0 = dt;
        self.world.resource_mut::<SimTick>().increment();

        self.physics_schedule.run(&mut self.world);

        self.tick += 1;
        self.time += dt;
        self.prune_craft_index();
    }

    fn prune_craft_index(&mut self) {
        let world = &self.world;
        self.crafts.retain(|_, entity| world.get::<CraftId>(*entity).is_some());
    }

    // ========================================================================
    // SPAWNING
    // ========================================================================

    /// Spawn a standard fighter. It is inert until registered with the
    /// swarm or handed to the player.
    pub fn spawn_craft(&mut self, position: Vec2, rotation: f32) -> Result<CraftId, SimError> {
        self.spawn_craft_from(&SpacecraftTemplate::fighter(), position, rotation)
    }

    pub fn spawn_craft_from(
        &mut self,
        template: &SpacecraftTemplate,
        position: Vec2,
        rotation: f32,
    ) -> Result<CraftId, SimError> {
        let id = CraftId(self.next_craft_id);
        let bundle = template.bundle(id, position, rotation)?;
        let entity = self.world.spawn(bundle).id();
        self.next_craft_id += 1;
        self.crafts.insert(id, entity);
        Ok(id)
    }

    /// Spawn a fighter and make it the player craft.
    pub fn spawn_player_craft(&mut self, position: Vec2, rotation: f32) -> Result<CraftId, SimError> {
        let id = self.spawn_craft(position, rotation)?;
        let entity = self.entity_of(id)?;
        self.world.entity_mut(entity).insert(PlayerControlled);
        self.switch_collision_layer(id, PLAYER_COLLISION_LAYER)?;
        *self.world.resource_mut::<PlayerState>() = PlayerState {
            craft: Some(entity),
            destroyed_reported: false,
        };
        info!("craft {} is the player", id.0);
        Ok(id)
    }

    /// Hand an existing craft to the swarm and move it onto the AI layer.
    /// The player craft is refused.
    pub fn add_spacecraft(&mut self, id: CraftId) -> Result<(), SimError> {
        let entity = self.entity_of(id)?;
        if self.world.get::<PlayerControlled>(entity).is_some() {
            warn!("craft {} is the player, not added to the swarm", id.0);
            return Err(SimError::PlayerCraft(id));
        }
        if self.world.get::<AiControlled>(entity).is_none() {
            self.world.entity_mut(entity).insert(AiBundle::default());
        }
        self.switch_collision_layer(id, AI_COLLISION_LAYER)?;
        if self.world.resource_mut::<Swarm>().register(entity, id) {
            info!("craft {} joined the swarm", id.0);
        }
        Ok(())
    }

    /// Spawn a planet on a circular orbit and register its gravity source.
    pub fn spawn_planet(
        &mut self,
        name: &str,
        orbit_center: Vec2,
        orbit_radius: f32,
        orbit_frequency: f32,
        gravity_strength: f32,
    ) -> Entity {
        let position = orbit_center + Vec2::new(orbit_radius, 0.0);
        let gravity_source = self
            .world
            .resource_mut::<GravityResource>()
            .0
            .register_source(position, gravity_strength);
        self.world
            .spawn((
                Planet {
                    name: name.to_string(),
                    orbit_center,
                    orbit_radius,
                    orbit_angle: 0.0,
                    orbit_frequency,
                    gravity_strength,
                    gravity_source,
                },
                Position::from(position),
            ))
            .id()
    }

    // ========================================================================
    // SWARM / PLAYER
    // ========================================================================

    /// Number of craft on the swarm roster.
    pub fn spaceship_count(&self) -> usize {
        self.world.resource::<Swarm>().len()
    }

    /// Point the swarm at a craft, or let it wander with `None`.
    pub fn set_swarm_target(&mut self, target: Option<CraftId>) -> Result<(), SimError> {
        let entity = target.map(|id| self.entity_of(id)).transpose()?;
        self.world.resource_mut::<Swarm>().target = entity;
        Ok(())
    }

    /// Point the swarm at the player craft, if there is one.
    pub fn set_swarm_target_player(&mut self) {
        let player = self.world.resource::<PlayerState>().craft;
        self.world.resource_mut::<Swarm>().target = player;
    }

    pub fn set_player_input(&mut self, input: PlayerInput) {
        *self.world.resource_mut::<PlayerInput>() = input;
    }

    // ========================================================================
    // SPACECRAFT COMMANDS
    // ========================================================================

    /// Entity behind a craft id, if the craft still exists.
    pub fn craft_entity(&self, id: CraftId) -> Option<Entity> {
        self.crafts
            .get(&id)
            .copied()
            .filter(|&entity| self.world.get::<CraftId>(entity).is_some())
    }

    fn entity_of(&self, id: CraftId) -> Result<Entity, SimError> {
        self.craft_entity(id).ok_or(SimError::UnknownCraft(id))
    }

    pub fn take_damage(&mut self, id: CraftId, amount: i32) -> Result<DamageOutcome, SimError> {
        let entity = self.entity_of(id)?;
        let mut state: SystemState<(
            Res<SimConfig>,
            ResMut<SimRng>,
            ResMut<SimEventBuffer>,
            Query<(&Position, &mut Hull, &mut Thrusters, Has<PlayerControlled>)>,
        )> = SystemState::new(&mut self.world);
        let (config, mut rng, mut events, mut crafts) = state.get_mut(&mut self.world);

        let (position, mut hull, mut thrusters, is_player) =
            crafts.get_mut(entity).map_err(|_| SimError::UnknownCraft(id))?;
        let outcome = spacecraft::take_hit(
            id,
            position,
            &mut hull,
            &mut thrusters,
            amount,
            HitContext {
                despawn_time: config.despawn_time,
                rng: &mut rng.0,
                events: &mut *events,
            },
        )
        .inspect_err(|err| warn!("craft {}: {err}", id.0))?;

        if is_player && outcome != DamageOutcome::AlreadyDestroyed {
            events.push(SimEvent::SlowMotion {
                kind: SlowMotionKind::Hard,
            });
        }
        Ok(outcome)
    }

    /// Fire the weapons of `group_index`. Returns the number of shots.
    pub fn fire_weapons(&mut self, id: CraftId, group_index: u32) -> Result<usize, SimError> {
        let entity = self.entity_of(id)?;
        let mut state: SystemState<(
            ResMut<SimEventBuffer>,
            Query<(&Position, &Rotation, &Hull, &mut Armament)>,
        )> = SystemState::new(&mut self.world);
        let (mut events, mut crafts) = state.get_mut(&mut self.world);

        let (position, rotation, hull, mut armament) =
            crafts.get_mut(entity).map_err(|_| SimError::UnknownCraft(id))?;
        Ok(spacecraft::fire_weapons(
            id,
            position,
            rotation,
            hull,
            &mut armament,
            group_index,
            &mut events,
        ))
    }

    /// Set the translational intent. Out-of-range input is rejected and the
    /// previous effort stays in force.
    pub fn set_target_movement_effort(&mut self, id: CraftId, effort: Vec2) -> Result<(), SimError> {
        let entity = self.entity_of(id)?;
        let mut flight = self
            .world
            .get_mut::<FlightControl>(entity)
            .ok_or(SimError::UnknownCraft(id))?;
        flight
            .set_effort(effort)
            .inspect_err(|err| warn!("craft {}: {err}", id.0))
    }

    /// Set the steering error the heading loop works on.
    pub fn set_turn_process_offset(&mut self, id: CraftId, offset: f32) -> Result<(), SimError> {
        if !offset.is_finite() {
            return Err(SimError::NonFiniteInput);
        }
        let entity = self.entity_of(id)?;
        let mut flight = self
            .world
            .get_mut::<FlightControl>(entity)
            .ok_or(SimError::UnknownCraft(id))?;
        flight.turn_offset = offset;
        Ok(())
    }

    pub fn switch_collision_layer(&mut self, id: CraftId, layer: u32) -> Result<(), SimError> {
        let entity = self.entity_of(id)?;
        let mut query = self.world.query::<(&mut CollisionLayers, &mut Armament)>();
        let (mut layers, mut armament) = query
            .get_mut(&mut self.world, entity)
            .map_err(|_| SimError::UnknownCraft(id))?;
        spacecraft::switch_collision_layer(&mut layers, &mut armament, layer)
    }

    pub fn is_destroyed(&self, id: CraftId) -> Result<bool, SimError> {
        let entity = self.entity_of(id)?;
        self.world
            .get::<Hull>(entity)
            .map(Hull::is_destroyed)
            .ok_or(SimError::UnknownCraft(id))
    }

    /// Wreck a craft directly. Returns false if it already was one.
    pub fn destroy_spacecraft(&mut self, id: CraftId) -> Result<bool, SimError> {
        let entity = self.entity_of(id)?;
        let mut state: SystemState<(
            Res<SimConfig>,
            ResMut<SimEventBuffer>,
            Query<(&Position, &mut Hull, &mut Thrusters)>,
        )> = SystemState::new(&mut self.world);
        let (config, mut events, mut crafts) = state.get_mut(&mut self.world);

        let (position, mut hull, mut thrusters) =
            crafts.get_mut(entity).map_err(|_| SimError::UnknownCraft(id))?;
        Ok(spacecraft::enter_destroyed(
            id,
            position,
            &mut hull,
            &mut thrusters,
            config.despawn_time,
            &mut events,
        ))
    }

    // ========================================================================
    // OUTPUT
    // ========================================================================

    /// Get a snapshot of the current simulation state.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::from_world(&mut self.world, self.tick, self.time)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> String {
        self.snapshot().to_json().unwrap_or_else(|_| "{}".to_string())
    }

    /// Take every event produced since the last call.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.world.resource_mut::<SimEventBuffer>().drain()
    }

    /// Get the current physics tick number.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Get the elapsed simulation time.
    pub fn current_time(&self) -> f32 {
        self.time
    }

    pub fn swarm(&self) -> &Swarm {
        self.world.resource::<Swarm>()
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}
