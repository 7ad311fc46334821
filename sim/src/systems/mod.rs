//! ECS Systems for the spacecraft simulation.
//!
//! Systems contain the per-tick logic that operates on components.
//!
//! ## Schedules
//!
//! Two schedules are driven by the host, each chained in order.
//!
//! **Decision tick** (variable rate):
//! - `player_control_system` - Applies host input to the player craft
//! - `roster_sweep_system` - Drops wrecked or vanished craft from the swarm
//! - `swarm_decision_system` - Aims, flies and fires every swarm craft
//!
//! **Physics tick** (fixed rate):
//! - `weapon_cooldown_system` - Counts down weapon cooldowns
//! - `flight_control_system` - PID heading loop and thrust allocation
//! - `gravity_system` - Adds the gravity field's pull
//! - `integration_system` - Integrates forces into motion
//! - `planet_orbit_system` - Moves planets and their gravity sources
//! - `flight_envelope_system` - Wrecks craft that fly too far out
//! - `despawn_system` - Tears wrecks down when their countdown ends

pub mod flight;
pub mod lifecycle;
pub mod planets;
pub mod player;
pub mod serialization;
pub mod swarm;

pub use flight::*;
pub use lifecycle::*;
pub use planets::*;
pub use player::*;
pub use serialization::*;
pub use swarm::*;
