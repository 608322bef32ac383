//! Collaborator interfaces the engine drives
//!
//! The engine never owns actors, items, or the world. Everything it reads or
//! mutates goes through these traits, bundled as [`Host`].

use lorebound_core::{ActorId, Tick, Vec3};

use crate::combat::equipment::EquipmentSlot;
use crate::combat::item::Item;
use crate::combat::status::StatusKind;
use crate::error::HostError;

/// Tag carried by actors under the Corruption spell
pub const CORRUPTED_TAG: &str = "corrupted";

/// Current and maximum health of an actor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    /// Health as a 0.0-1.0 fraction
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.current / self.max).clamp(0.0, 1.0)
    }
}

/// Items equipped by actors and their lore
pub trait EquipmentStore {
    /// Item in a slot (cloned)
    fn item(&self, actor: ActorId, slot: EquipmentSlot) -> Option<Item>;

    /// Replace the item in a slot
    fn set_item(
        &mut self,
        actor: ActorId,
        slot: EquipmentSlot,
        item: Option<Item>,
    ) -> Result<(), HostError>;

    /// Replace the lore of the item in a slot
    fn set_lore(
        &mut self,
        actor: ActorId,
        slot: EquipmentSlot,
        lines: Vec<String>,
    ) -> Result<(), HostError>;

    /// Lore of the item in a slot, empty when the slot is empty
    fn lore(&self, actor: ActorId, slot: EquipmentSlot) -> Vec<String> {
        self.item(actor, slot).map(|i| i.lore).unwrap_or_default()
    }

    /// First lore line of the item in a slot
    fn first_lore(&self, actor: ActorId, slot: EquipmentSlot) -> Option<String> {
        self.lore(actor, slot).into_iter().next()
    }
}

/// Actor lookup, tags, and the actor-level mutations spells perform
pub trait ActorDirectory {
    /// Whether the actor still exists (not disconnected or despawned)
    fn is_valid(&self, actor: ActorId) -> bool;

    /// Whether the actor exists and is not dead
    fn is_alive(&self, actor: ActorId) -> bool;

    /// Every valid, non-dead actor
    fn live_actors(&self) -> Vec<ActorId>;

    fn has_tag(&self, actor: ActorId, tag: &str) -> bool;
    fn add_tag(&mut self, actor: ActorId, tag: &str) -> Result<(), HostError>;
    fn remove_tag(&mut self, actor: ActorId, tag: &str) -> Result<(), HostError>;

    fn health(&self, actor: ActorId) -> Option<Health>;
    fn apply_damage(
        &mut self,
        actor: ActorId,
        amount: f32,
        source: Option<ActorId>,
    ) -> Result<(), HostError>;
    fn heal(&mut self, actor: ActorId, amount: f32) -> Result<(), HostError>;

    fn apply_status(
        &mut self,
        actor: ActorId,
        kind: StatusKind,
        duration: Tick,
        amplifier: u8,
    ) -> Result<(), HostError>;
    fn remove_status(&mut self, actor: ActorId, kind: StatusKind) -> Result<(), HostError>;
    fn has_status(&self, actor: ActorId, kind: StatusKind) -> bool;
    fn set_on_fire(&mut self, actor: ActorId, duration: Tick) -> Result<(), HostError>;

    fn position(&self, actor: ActorId) -> Option<Vec3>;
    fn teleport(&mut self, actor: ActorId, to: Vec3) -> Result<(), HostError>;
    /// Push an actor along `direction` (normalized by the host)
    fn knockback(&mut self, actor: ActorId, direction: Vec3, strength: f32)
        -> Result<(), HostError>;
    fn is_sprinting(&self, actor: ActorId) -> bool;

    /// Live actors within `radius` of `center`
    fn actors_near(&self, center: Vec3, radius: f32) -> Vec<ActorId>;

    /// Whether the actor is under Corruption
    fn is_corrupted(&self, actor: ActorId) -> bool {
        self.has_tag(actor, CORRUPTED_TAG)
    }
}

/// Fire-and-forget world commands
pub trait WorldEffects {
    fn strike_lightning(&mut self, at: Vec3) -> Result<(), HostError>;
    fn explode(&mut self, at: Vec3, power: f32, source: Option<ActorId>) -> Result<(), HostError>;
    fn ignite_block(&mut self, at: Vec3) -> Result<(), HostError>;
    /// Spawn an extra arrow carrying the given bow lore
    fn spawn_arrow(
        &mut self,
        shooter: ActorId,
        lore: &[String],
        direction: Vec3,
        speed: f32,
    ) -> Result<(), HostError>;
    /// Break a block, returning the id of what was there
    fn break_block(&mut self, breaker: ActorId, at: Vec3) -> Result<Option<String>, HostError>;
}

/// Short transient messages to players
pub trait PresentationSink {
    fn show(&mut self, actor: ActorId, text: &str);
}

/// Everything the engine needs from its surroundings
pub trait Host: EquipmentStore + ActorDirectory + WorldEffects + PresentationSink {}

impl<T> Host for T where T: EquipmentStore + ActorDirectory + WorldEffects + PresentationSink {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_fraction() {
        let h = Health {
            current: 25.0,
            max: 100.0,
        };
        assert_eq!(h.fraction(), 0.25);
        let zero = Health {
            current: 5.0,
            max: 0.0,
        };
        assert_eq!(zero.fraction(), 0.0);
    }
}
