//! Roster of swarm-controlled craft.
//!
//! The roster holds handles, never the craft themselves. Craft lifetime belongs to the world:
//! a handle may point at a wreck or at nothing at all by the time the next
//! decision tick runs, so every tick starts with [`Swarm::sweep`].

use crate::components::CraftId;
use bevy_ecs::prelude::*;

/// A roster slot. The id is kept so removals can be reported even after
/// the entity itself is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterEntry {
    pub entity: Entity,
    pub craft: CraftId,
}

#[derive(Resource, Debug, Default, Clone)]
pub struct Swarm {
    roster: Vec<RosterEntry>,
    /// What every swarm craft hunts. `None` means wander.
    pub target: Option<Entity>,
}

impl Swarm {
    /// Add a craft. Returns false if it was already on the roster.
    pub fn register(&mut self, entity: Entity, craft: CraftId) -> bool {
        if self.contains(entity) {
            return false;
        }
        self.roster.push(RosterEntry { entity, craft });
        true
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.roster.iter().any(|entry| entry.entity == entity)
    }

    /// Drop every entry for which `is_live` is false, in a single
    /// order-preserving pass. Returns the removed handles in roster order.
    pub fn sweep(&mut self, mut is_live: impl FnMut(Entity) -> bool) -> Vec<RosterEntry> {
        let mut removed = Vec::new();
        self.roster.retain(|entry| {
            let keep = is_live(entry.entity);
            if !keep {
                removed.push(*entry);
            }
            keep
        });
        removed
    }
}
