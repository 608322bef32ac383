//! In-memory host
//!
//! A self-contained world of actors, equipment, and blocks that implements
//! every collaborator trait. Used by the demo binary and by engine tests.

use std::collections::{BTreeSet, HashMap, HashSet};

use lorebound_core::{ActorId, Tick, Vec3};
use serde::Serialize;

use crate::combat::equipment::{EquipmentSet, EquipmentSlot};
use crate::combat::item::Item;
use crate::combat::status::{StatusEffect, StatusKind, StatusManager};
use crate::error::HostError;
use crate::host::{ActorDirectory, EquipmentStore, Health, PresentationSink, WorldEffects};

/// Health a freshly spawned sandbox actor starts with
pub const DEFAULT_MAX_HEALTH: f32 = 20.0;

/// Damage dealt per second while burning
const FIRE_DAMAGE_PER_SECOND: f32 = 1.0;

/// An actor living in the sandbox
#[derive(Debug, Clone, Serialize)]
pub struct SandboxActor {
    pub name: String,
    pub health: f32,
    pub max_health: f32,
    pub position: Vec3,
    pub sprinting: bool,
    pub tags: BTreeSet<String>,
    pub statuses: StatusManager,
    pub equipment: EquipmentSet,
    /// Ticks of fire left
    pub burning: Tick,
    /// Accumulated knockback, for inspection
    pub pushed: Vec3,
}

impl SandboxActor {
    fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            health: DEFAULT_MAX_HEALTH,
            max_health: DEFAULT_MAX_HEALTH,
            position,
            sprinting: false,
            tags: BTreeSet::new(),
            statuses: StatusManager::new(),
            equipment: EquipmentSet::new(),
            burning: 0,
            pushed: Vec3::ZERO,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

/// A world command recorded by the sandbox
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum WorldAction {
    Lightning { at: Vec3 },
    Explosion { at: Vec3, power: f32 },
    Ignite { at: Vec3 },
    Arrow { shooter: ActorId, direction: Vec3, speed: f32, lore: Vec<String> },
    BlockBroken { at: Vec3, block: String },
}

fn block_key(at: Vec3) -> (i32, i32, i32) {
    let f = at.floor();
    (f.x as i32, f.y as i32, f.z as i32)
}

/// In-memory world implementing [`crate::Host`]
#[derive(Debug, Default)]
pub struct Sandbox {
    actors: HashMap<ActorId, SandboxActor>,
    blocks: HashMap<(i32, i32, i32), String>,
    /// Actors whose mutations are rejected
    refusing: HashSet<ActorId>,
    /// Messages shown to actors, in order
    pub messages: Vec<(ActorId, String)>,
    /// World commands issued, in order
    pub world_log: Vec<WorldAction>,
}

impl Sandbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an actor and return its id
    pub fn spawn(&mut self, name: impl Into<String>, position: Vec3) -> ActorId {
        let id = ActorId::new();
        self.actors.insert(id, SandboxActor::new(name, position));
        id
    }

    /// Remove an actor entirely, as if it disconnected
    pub fn despawn(&mut self, actor: ActorId) -> Option<SandboxActor> {
        self.actors.remove(&actor)
    }

    /// Drop an actor's health to zero
    pub fn kill(&mut self, actor: ActorId) {
        if let Some(a) = self.actors.get_mut(&actor) {
            a.health = 0.0;
        }
    }

    pub fn actor(&self, actor: ActorId) -> Option<&SandboxActor> {
        self.actors.get(&actor)
    }

    /// Make every mutation aimed at `actor` fail with
    /// [`HostError::CommandRejected`], as a host refusing commands would
    pub fn refuse_commands(&mut self, actor: ActorId, refuse: bool) {
        if refuse {
            self.refusing.insert(actor);
        } else {
            self.refusing.remove(&actor);
        }
    }

    /// All actors, sorted by name for stable output
    pub fn actors(&self) -> Vec<(ActorId, &SandboxActor)> {
        let mut all: Vec<_> = self.actors.iter().map(|(id, a)| (*id, a)).collect();
        all.sort_by(|a, b| a.1.name.cmp(&b.1.name));
        all
    }

    /// Put an item in a slot, returning the previous one
    pub fn equip(&mut self, actor: ActorId, slot: EquipmentSlot, item: Item) -> Option<Item> {
        self.actors
            .get_mut(&actor)
            .and_then(|a| a.equipment.equip(slot, item))
    }

    pub fn unequip(&mut self, actor: ActorId, slot: EquipmentSlot) -> Option<Item> {
        self.actors
            .get_mut(&actor)
            .and_then(|a| a.equipment.unequip(slot))
    }

    pub fn set_sprinting(&mut self, actor: ActorId, sprinting: bool) {
        if let Some(a) = self.actors.get_mut(&actor) {
            a.sprinting = sprinting;
        }
    }

    pub fn place_block(&mut self, at: Vec3, block: impl Into<String>) {
        self.blocks.insert(block_key(at), block.into());
    }

    pub fn block_at(&self, at: Vec3) -> Option<&str> {
        self.blocks.get(&block_key(at)).map(|s| s.as_str())
    }

    /// Messages shown to one actor
    pub fn messages_for(&self, actor: ActorId) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(a, _)| *a == actor)
            .map(|(_, m)| m.as_str())
            .collect()
    }

    /// Advance sandbox-owned timers: statuses decay, fire burns
    pub fn step(&mut self, ticks: Tick, ticks_per_second: u64) {
        for actor in self.actors.values_mut() {
            if actor.is_dead() {
                continue;
            }
            actor.statuses.update(ticks);
            if actor.burning > 0 {
                let burned = ticks.min(actor.burning);
                actor.burning -= burned;
                let has_ward = actor.statuses.has_effect(StatusKind::FireResistance);
                if !has_ward {
                    let seconds = burned as f32 / ticks_per_second.max(1) as f32;
                    actor.health = (actor.health - seconds * FIRE_DAMAGE_PER_SECOND).max(0.0);
                }
            }
        }
    }

    fn get(&self, actor: ActorId) -> Result<&SandboxActor, HostError> {
        self.actors.get(&actor).ok_or(HostError::UnknownActor(actor))
    }

    fn get_mut(&mut self, actor: ActorId) -> Result<&mut SandboxActor, HostError> {
        if self.refusing.contains(&actor) {
            return Err(HostError::CommandRejected(format!("{actor} refuses commands")));
        }
        self.actors
            .get_mut(&actor)
            .ok_or(HostError::UnknownActor(actor))
    }

    fn get_live_mut(&mut self, actor: ActorId) -> Result<&mut SandboxActor, HostError> {
        let a = self.get_mut(actor)?;
        if a.is_dead() {
            return Err(HostError::DeadActor(actor));
        }
        Ok(a)
    }
}

impl EquipmentStore for Sandbox {
    fn item(&self, actor: ActorId, slot: EquipmentSlot) -> Option<Item> {
        self.actors
            .get(&actor)
            .and_then(|a| a.equipment.get(slot).cloned())
    }

    fn set_item(
        &mut self,
        actor: ActorId,
        slot: EquipmentSlot,
        item: Option<Item>,
    ) -> Result<(), HostError> {
        let a = self.get_mut(actor)?;
        *a.equipment.get_mut(slot) = item;
        Ok(())
    }

    fn set_lore(
        &mut self,
        actor: ActorId,
        slot: EquipmentSlot,
        lines: Vec<String>,
    ) -> Result<(), HostError> {
        let a = self.get_mut(actor)?;
        match a.equipment.get_mut(slot) {
            Some(item) => {
                item.lore = lines;
                Ok(())
            }
            None => Err(HostError::CommandRejected(format!(
                "no item in {} slot",
                slot.name()
            ))),
        }
    }
}

impl ActorDirectory for Sandbox {
    fn is_valid(&self, actor: ActorId) -> bool {
        self.actors.contains_key(&actor)
    }

    fn is_alive(&self, actor: ActorId) -> bool {
        self.actors.get(&actor).is_some_and(|a| !a.is_dead())
    }

    fn live_actors(&self) -> Vec<ActorId> {
        let mut ids: Vec<ActorId> = self
            .actors
            .iter()
            .filter(|(_, a)| !a.is_dead())
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    fn has_tag(&self, actor: ActorId, tag: &str) -> bool {
        self.actors.get(&actor).is_some_and(|a| a.tags.contains(tag))
    }

    fn add_tag(&mut self, actor: ActorId, tag: &str) -> Result<(), HostError> {
        let a = self.get_mut(actor)?;
        a.tags.insert(tag.to_string());
        Ok(())
    }

    fn remove_tag(&mut self, actor: ActorId, tag: &str) -> Result<(), HostError> {
        let a = self.get_mut(actor)?;
        a.tags.remove(tag);
        Ok(())
    }

    fn health(&self, actor: ActorId) -> Option<Health> {
        self.actors.get(&actor).map(|a| Health {
            current: a.health,
            max: a.max_health,
        })
    }

    fn apply_damage(
        &mut self,
        actor: ActorId,
        amount: f32,
        _source: Option<ActorId>,
    ) -> Result<(), HostError> {
        let a = self.get_live_mut(actor)?;
        let resisted = match a.statuses.get(StatusKind::Resistance) {
            Some(r) => amount * (1.0 - 0.2 * (r.amplifier as f32 + 1.0)).max(0.0),
            None => amount,
        };
        a.health = (a.health - resisted).max(0.0);
        Ok(())
    }

    fn heal(&mut self, actor: ActorId, amount: f32) -> Result<(), HostError> {
        let a = self.get_live_mut(actor)?;
        a.health = (a.health + amount).min(a.max_health);
        Ok(())
    }

    fn apply_status(
        &mut self,
        actor: ActorId,
        kind: StatusKind,
        duration: Tick,
        amplifier: u8,
    ) -> Result<(), HostError> {
        let a = self.get_live_mut(actor)?;
        a.statuses.apply(StatusEffect::new(kind, duration, amplifier));
        if kind == StatusKind::HealthBoost {
            a.max_health = DEFAULT_MAX_HEALTH + 4.0 * (amplifier as f32 + 1.0);
        }
        Ok(())
    }

    fn remove_status(&mut self, actor: ActorId, kind: StatusKind) -> Result<(), HostError> {
        let a = self.get_mut(actor)?;
        a.statuses.remove(kind);
        if kind == StatusKind::HealthBoost {
            a.max_health = DEFAULT_MAX_HEALTH;
            a.health = a.health.min(a.max_health);
        }
        Ok(())
    }

    fn has_status(&self, actor: ActorId, kind: StatusKind) -> bool {
        self.actors
            .get(&actor)
            .is_some_and(|a| a.statuses.has_effect(kind))
    }

    fn set_on_fire(&mut self, actor: ActorId, duration: Tick) -> Result<(), HostError> {
        let a = self.get_live_mut(actor)?;
        a.burning = a.burning.max(duration);
        Ok(())
    }

    fn position(&self, actor: ActorId) -> Option<Vec3> {
        self.actors.get(&actor).map(|a| a.position)
    }

    fn teleport(&mut self, actor: ActorId, to: Vec3) -> Result<(), HostError> {
        let a = self.get_live_mut(actor)?;
        a.position = to;
        Ok(())
    }

    fn knockback(
        &mut self,
        actor: ActorId,
        direction: Vec3,
        strength: f32,
    ) -> Result<(), HostError> {
        let a = self.get_live_mut(actor)?;
        let push = direction.normalize_or_zero() * strength;
        a.position += push;
        a.pushed += push;
        Ok(())
    }

    fn is_sprinting(&self, actor: ActorId) -> bool {
        self.actors.get(&actor).is_some_and(|a| a.sprinting)
    }

    fn actors_near(&self, center: Vec3, radius: f32) -> Vec<ActorId> {
        let mut ids: Vec<ActorId> = self
            .actors
            .iter()
            .filter(|(_, a)| !a.is_dead() && a.position.distance(center) <= radius)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }
}

impl WorldEffects for Sandbox {
    fn strike_lightning(&mut self, at: Vec3) -> Result<(), HostError> {
        self.world_log.push(WorldAction::Lightning { at });
        Ok(())
    }

    fn explode(&mut self, at: Vec3, power: f32, _source: Option<ActorId>) -> Result<(), HostError> {
        self.world_log.push(WorldAction::Explosion { at, power });
        Ok(())
    }

    fn ignite_block(&mut self, at: Vec3) -> Result<(), HostError> {
        self.world_log.push(WorldAction::Ignite { at });
        Ok(())
    }

    fn spawn_arrow(
        &mut self,
        shooter: ActorId,
        lore: &[String],
        direction: Vec3,
        speed: f32,
    ) -> Result<(), HostError> {
        self.get(shooter)?;
        self.world_log.push(WorldAction::Arrow {
            shooter,
            direction,
            speed,
            lore: lore.to_vec(),
        });
        Ok(())
    }

    fn break_block(&mut self, breaker: ActorId, at: Vec3) -> Result<Option<String>, HostError> {
        self.get(breaker)?;
        let Some(block) = self.blocks.remove(&block_key(at)) else {
            return Ok(None);
        };
        self.world_log.push(WorldAction::BlockBroken {
            at,
            block: block.clone(),
        });
        Ok(Some(block))
    }
}

impl PresentationSink for Sandbox {
    fn show(&mut self, actor: ActorId, text: &str) {
        self.messages.push((actor, text.to_string()));
    }
}
