//! Override - Spacecraft Simulation Core
//!
//! A fixed-timestep ECS simulation of thruster-driven spacecraft, a
//! swarm of AI pilots and the player craft they hunt.
//! Uses `bevy_ecs` for the entity-component-system architecture.

pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod fire_control;
pub mod godot_bridge;
pub mod gravity;
pub mod math;
pub mod pid;
pub mod spacecraft;
pub mod swarm;
pub mod systems;
pub mod targeting;
pub mod thrust;
pub mod world;

pub use api::SimWorld;
pub use components::*;
pub use config::{SimConfig, SimRate, SimRng, SimTick};
pub use error::SimError;
pub use events::{SimEvent, SimEventBuffer};
pub use gravity::{GravityField, NoGravity, PointGravityField};
pub use math::Vec2;
pub use spacecraft::SpacecraftTemplate;
pub use swarm::Swarm;
pub use systems::*;
pub use world::Snapshot;
