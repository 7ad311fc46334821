//! Error type for caller-facing simulation operations.
//!
//! Tick systems never fail: missing targets and vanished craft fall back to
//! defined behavior. Only data handed in by the host is validated here.

use crate::components::CraftId;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum SimError {
    /// Movement effort component outside [-1, 1].
    MovementEffortOutOfRange { x: f32, y: f32 },
    /// NaN or infinite value passed where a finite one is required.
    NonFiniteInput,
    NegativeDamage(i32),
    /// Collision layers are numbered 1..=32.
    InvalidCollisionLayer(u32),
    /// A spacecraft needs at least one thruster.
    NoThrusters,
    InvalidTemplate(&'static str),
    /// The id was never issued, or the craft has been torn down.
    UnknownCraft(CraftId),
    /// The player craft cannot join the swarm.
    PlayerCraft(CraftId),
    InvalidConfig(&'static str),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MovementEffortOutOfRange { x, y } => write!(
                f,
                "movement effort out of range: ({x}, {y}), each axis must be within [-1, 1]"
            ),
            Self::NonFiniteInput => write!(f, "input value is not finite"),
            Self::NegativeDamage(amount) => write!(f, "negative damage: {amount}"),
            Self::InvalidCollisionLayer(layer) => {
                write!(f, "invalid collision layer {layer} (allowed 1..=32)")
            }
            Self::NoThrusters => write!(f, "spacecraft template has no thrusters"),
            Self::InvalidTemplate(reason) => write!(f, "invalid spacecraft template: {reason}"),
            Self::UnknownCraft(id) => write!(f, "unknown spacecraft id {}", id.0),
            Self::PlayerCraft(id) => write!(f, "spacecraft {} is player controlled", id.0),
            Self::InvalidConfig(reason) => write!(f, "invalid simulation config: {reason}"),
        }
    }
}

impl std::error::Error for SimError {}
