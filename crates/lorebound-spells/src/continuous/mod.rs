//! Continuous armor effects
//!
//! Some armor spells run for as long as the piece is worn. Each (actor, armor
//! slot) holds at most one machine; the manager creates, updates and tears
//! machines down from what it sees on every tick.

pub mod machines;

use std::collections::{HashMap, HashSet};
use std::fmt;

use lorebound_core::{ActorId, Tick};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::combat::equipment::ARMOR_SLOTS;
use crate::error::{CatalogError, EffectError};
use crate::host::Host;
use crate::spell::catalog::SpellTable;
use crate::spell::codec;
use crate::spell::kinds::{ArmorSpell, SpellKind};

/// A long-running armor effect bound to one slot
pub trait ContinuousEffect: fmt::Debug {
    /// Called once per tick while the actor is alive
    fn update(
        &mut self,
        host: &mut dyn Host,
        actor: ActorId,
        now: Tick,
        corrupted: bool,
    ) -> Result<(), EffectError>;

    /// Called exactly once when the machine is torn down
    fn remove(&mut self, host: &mut dyn Host, actor: ActorId) -> Result<(), EffectError>;
}

/// Builds a machine from the token tier and the current tick
pub type MachineFactory = fn(u8, Tick) -> Box<dyn ContinuousEffect>;

/// Base label -> machine factory
#[derive(Debug, Clone, Default)]
pub struct MachineRegistry {
    factories: HashMap<&'static str, MachineFactory>,
}

impl MachineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a factory to an armor label that exists in `armor`
    pub fn register(
        &mut self,
        label: &str,
        factory: MachineFactory,
        armor: &SpellTable,
    ) -> Result<(), CatalogError> {
        let kind = ArmorSpell::from_label(label)
            .filter(|_| armor.get(label).is_some())
            .ok_or_else(|| CatalogError::UnknownMachineLabel(label.to_string()))?;
        let key = kind.label();
        if self.factories.contains_key(key) {
            return Err(CatalogError::DuplicateLabel {
                category: "machine",
                label: key.to_string(),
            });
        }
        self.factories.insert(key, factory);
        Ok(())
    }

    /// Registry with every continuous armor spell wired
    pub fn build(armor: &SpellTable) -> Result<Self, CatalogError> {
        let mut registry = Self::new();
        for &kind in ArmorSpell::all() {
            if let Some(factory) = machines::factory(kind) {
                registry.register(kind.label(), factory, armor)?;
            }
        }
        Ok(registry)
    }

    pub fn factory(&self, label: &str) -> Option<MachineFactory> {
        self.factories.get(label).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.factories.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// An armor label worn in more than one slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateArmor {
    pub actor: ActorId,
    pub label: String,
}

/// What one machine sweep did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepReport {
    pub actors_updated: usize,
    pub machines_created: usize,
    pub machines_removed: usize,
    pub failures: usize,
    /// Newly detected duplicates; each is reported once until it clears
    pub duplicates: Vec<DuplicateArmor>,
}

#[derive(Debug)]
struct ActiveMachine {
    label: String,
    tier: u8,
    machine: Box<dyn ContinuousEffect>,
}

type Slots = [Option<ActiveMachine>; 4];

/// Machine lifecycle per (actor, armor slot)
#[derive(Debug, Default)]
pub struct MachineManager {
    slots: HashMap<ActorId, Slots>,
    /// Duplicate labels already reported, per actor
    reported: HashMap<ActorId, HashSet<String>>,
}

impl MachineManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring every actor's machines in line with what it wears
    pub fn sweep(
        &mut self,
        registry: &MachineRegistry,
        host: &mut dyn Host,
        now: Tick,
        announce: bool,
    ) -> SweepReport {
        let mut report = SweepReport::default();
        for actor in host.live_actors() {
            self.update_actor(registry, host, actor, now, announce, &mut report);
            report.actors_updated += 1;
        }

        let gone: Vec<ActorId> = self
            .slots
            .keys()
            .copied()
            .filter(|a| !host.is_valid(*a))
            .collect();
        for actor in gone {
            debug!("purging machines of vanished actor {actor}");
            report.machines_removed += self.remove_actor(host, actor);
        }
        self.reported.retain(|a, _| host.is_valid(*a));
        report
    }

    fn update_actor(
        &mut self,
        registry: &MachineRegistry,
        host: &mut dyn Host,
        actor: ActorId,
        now: Tick,
        announce: bool,
        report: &mut SweepReport,
    ) {
        let corrupted = host.is_corrupted(actor);
        let worn: [Option<(String, u8)>; 4] = ARMOR_SLOTS.map(|slot| {
            host.first_lore(actor, slot).map(|line| {
                let token = codec::decode(&line);
                (token.base.to_string(), token.tier)
            })
        });

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for (label, _) in worn.iter().flatten() {
            *counts.entry(label.as_str()).or_default() += 1;
        }
        let duplicated: HashSet<&str> = counts
            .into_iter()
            .filter(|&(_, n)| n > 1)
            .map(|(label, _)| label)
            .collect();

        let reported = self.reported.entry(actor).or_default();
        reported.retain(|label| duplicated.contains(label.as_str()));
        let mut fresh: Vec<&str> = duplicated
            .iter()
            .copied()
            .filter(|label| !reported.contains(*label))
            .collect();
        fresh.sort_unstable();
        for label in fresh {
            reported.insert(label.to_string());
            warn!("{actor} wears {label:?} more than once; all copies are suppressed");
            if announce {
                host.show(
                    actor,
                    &format!("{} is worn more than once and has no effect", label.trim_end()),
                );
            }
            report.duplicates.push(DuplicateArmor {
                actor,
                label: label.to_string(),
            });
        }

        let slots = self.slots.entry(actor).or_default();
        for (i, current) in worn.iter().enumerate() {
            let label = current.as_ref().map(|(l, _)| l.as_str());
            let is_duplicate = label.is_some_and(|l| duplicated.contains(l));

            let stale = slots[i]
                .as_ref()
                .is_some_and(|m| Some(m.label.as_str()) != label || is_duplicate);
            if stale {
                if let Some(mut old) = slots[i].take() {
                    debug!("removing {:?} machine from {actor}", old.label);
                    if let Err(e) = old.machine.remove(host, actor) {
                        warn!("Failed to remove {:?} from {actor}: {e}", old.label);
                        report.failures += 1;
                    }
                    report.machines_removed += 1;
                }
            }

            if let Some(active) = slots[i].as_mut() {
                if let Err(e) = active.machine.update(host, actor, now, corrupted) {
                    warn!("{:?} update failed for {actor}: {e}", active.label);
                    report.failures += 1;
                }
            } else if let Some((label, tier)) = current {
                if is_duplicate {
                    continue;
                }
                if let Some(factory) = registry.factory(label) {
                    debug!("starting {label:?} machine for {actor}");
                    slots[i] = Some(ActiveMachine {
                        label: label.clone(),
                        tier: *tier,
                        machine: factory(*tier, now),
                    });
                    report.machines_created += 1;
                }
            }
        }

        if slots.iter().all(Option::is_none) {
            self.slots.remove(&actor);
        }
    }

    /// Tear down every machine of `actor`, calling `remove` on each.
    /// Returns how many were running.
    pub fn remove_actor(&mut self, host: &mut dyn Host, actor: ActorId) -> usize {
        self.reported.remove(&actor);
        let Some(slots) = self.slots.remove(&actor) else {
            return 0;
        };
        let mut removed = 0;
        for mut active in slots.into_iter().flatten() {
            if let Err(e) = active.machine.remove(host, actor) {
                debug!("removing {:?} from departed {actor}: {e}", active.label);
            }
            removed += 1;
        }
        if removed > 0 {
            info!("Removed {removed} machines from {actor}");
        }
        removed
    }

    /// Labels with a running machine, in slot order
    pub fn active_labels(&self, actor: ActorId) -> Vec<&str> {
        self.slots
            .get(&actor)
            .map(|slots| {
                slots
                    .iter()
                    .flatten()
                    .map(|m| m.label.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Tier of the machine running for `label`
    pub fn active_tier(&self, actor: ActorId, label: &str) -> Option<u8> {
        self.slots
            .get(&actor)?
            .iter()
            .flatten()
            .find(|m| m.label == label)
            .map(|m| m.tier)
    }

    pub fn count_for(&self, actor: ActorId) -> usize {
        self.slots
            .get(&actor)
            .map_or(0, |slots| slots.iter().flatten().count())
    }

    /// Running machines across all actors
    pub fn total(&self) -> usize {
        self.slots
            .values()
            .map(|slots| slots.iter().flatten().count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::equipment::EquipmentSlot;
    use crate::combat::item::{Item, ItemKind};
    use crate::combat::status::StatusKind;
    use crate::error::HostError;
    use crate::host::ActorDirectory;
    use crate::sandbox::Sandbox;
    use lorebound_core::Vec3;

    fn armor_table() -> SpellTable {
        SpellTable::of::<ArmorSpell>().unwrap()
    }

    fn wear(sandbox: &mut Sandbox, actor: ActorId, slot: EquipmentSlot, lore: &str) {
        sandbox.equip(
            actor,
            slot,
            Item::new(1, "piece", ItemKind::Armor).with_lore([lore]),
        );
    }

    fn no_op(_tier: u8, _now: Tick) -> Box<dyn ContinuousEffect> {
        Box::new(machines::FrostAura::new(0, 0))
    }

    /// A machine whose every update is rejected by the host
    #[derive(Debug)]
    struct Rejected;

    impl ContinuousEffect for Rejected {
        fn update(
            &mut self,
            _host: &mut dyn Host,
            _actor: ActorId,
            _now: Tick,
            _corrupted: bool,
        ) -> Result<(), EffectError> {
            Err(HostError::CommandRejected("status refused".into()).into())
        }

        fn remove(&mut self, _host: &mut dyn Host, _actor: ActorId) -> Result<(), EffectError> {
            Ok(())
        }
    }

    fn rejected(_tier: u8, _now: Tick) -> Box<dyn ContinuousEffect> {
        Box::new(Rejected)
    }

    #[test]
    fn test_register_rejects_unknown_label() {
        let mut registry = MachineRegistry::new();
        assert_eq!(
            registry.register("Bogus ", no_op, &armor_table()),
            Err(CatalogError::UnknownMachineLabel("Bogus ".into()))
        );
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = MachineRegistry::new();
        registry.register("Gills", no_op, &armor_table()).unwrap();
        assert!(matches!(
            registry.register("Gills", no_op, &armor_table()),
            Err(CatalogError::DuplicateLabel { .. })
        ));
    }

    #[test]
    fn test_machine_follows_equipment() {
        let registry = MachineRegistry::build(&armor_table()).unwrap();
        let mut manager = MachineManager::new();
        let mut sandbox = Sandbox::new();
        let a = sandbox.spawn("a", Vec3::ZERO);

        wear(&mut sandbox, a, EquipmentSlot::Head, "Gills");
        let report = manager.sweep(&registry, &mut sandbox, 1, true);
        assert_eq!(report.machines_created, 1);
        assert_eq!(manager.active_labels(a), vec!["Gills"]);

        // Still worn: updated, not recreated
        let report = manager.sweep(&registry, &mut sandbox, 2, true);
        assert_eq!(report.machines_created, 0);
        assert!(sandbox.has_status(a, StatusKind::WaterBreathing));

        // Swapped for a different spell: old machine removed, new one started
        wear(&mut sandbox, a, EquipmentSlot::Head, "Fire Ward");
        let report = manager.sweep(&registry, &mut sandbox, 3, true);
        assert_eq!(report.machines_removed, 1);
        assert_eq!(report.machines_created, 1);
        assert!(!sandbox.has_status(a, StatusKind::WaterBreathing));
        assert_eq!(manager.active_labels(a), vec!["Fire Ward"]);

        sandbox.unequip(a, EquipmentSlot::Head);
        manager.sweep(&registry, &mut sandbox, 4, true);
        assert_eq!(manager.count_for(a), 0);
        assert!(!sandbox.has_status(a, StatusKind::FireResistance));
    }

    #[test]
    fn test_reactive_armor_spells_get_no_machine() {
        let registry = MachineRegistry::build(&armor_table()).unwrap();
        let mut manager = MachineManager::new();
        let mut sandbox = Sandbox::new();
        let a = sandbox.spawn("a", Vec3::ZERO);
        wear(&mut sandbox, a, EquipmentSlot::Chest, "Thorns II");
        manager.sweep(&registry, &mut sandbox, 1, true);
        assert_eq!(manager.total(), 0);
    }

    #[test]
    fn test_duplicates_suppressed_and_reported_once() {
        let registry = MachineRegistry::build(&armor_table()).unwrap();
        let mut manager = MachineManager::new();
        let mut sandbox = Sandbox::new();
        let a = sandbox.spawn("a", Vec3::ZERO);
        wear(&mut sandbox, a, EquipmentSlot::Head, "Vitality I");
        wear(&mut sandbox, a, EquipmentSlot::Chest, "Vitality II");
        wear(&mut sandbox, a, EquipmentSlot::Feet, "Gills");

        let mut diagnostics = 0;
        for now in 1..=5 {
            let report = manager.sweep(&registry, &mut sandbox, now, true);
            diagnostics += report.duplicates.len();
        }
        assert_eq!(diagnostics, 1);
        assert_eq!(manager.active_labels(a), vec!["Gills"]);
        assert_eq!(sandbox.messages_for(a).len(), 1);

        // Clearing the duplicate lets the survivor start and re-arms the diagnostic
        sandbox.unequip(a, EquipmentSlot::Chest);
        manager.sweep(&registry, &mut sandbox, 6, true);
        assert_eq!(manager.active_tier(a, "Vitality "), Some(1));

        wear(&mut sandbox, a, EquipmentSlot::Legs, "Vitality III");
        let report = manager.sweep(&registry, &mut sandbox, 7, true);
        assert_eq!(report.duplicates.len(), 1);
        assert_eq!(report.machines_removed, 1);
        assert_eq!(manager.active_labels(a), vec!["Gills"]);
    }

    #[test]
    fn test_vanished_actor_is_purged() {
        let registry = MachineRegistry::build(&armor_table()).unwrap();
        let mut manager = MachineManager::new();
        let mut sandbox = Sandbox::new();
        let a = sandbox.spawn("a", Vec3::ZERO);
        wear(&mut sandbox, a, EquipmentSlot::Head, "Night Sight");
        manager.sweep(&registry, &mut sandbox, 1, false);
        assert_eq!(manager.count_for(a), 1);

        sandbox.despawn(a);
        let report = manager.sweep(&registry, &mut sandbox, 2, false);
        assert_eq!(report.machines_removed, 1);
        assert_eq!(manager.total(), 0);
    }

    #[test]
    fn test_dead_actor_machines_are_kept_but_idle() {
        let registry = MachineRegistry::build(&armor_table()).unwrap();
        let mut manager = MachineManager::new();
        let mut sandbox = Sandbox::new();
        let a = sandbox.spawn("a", Vec3::ZERO);
        wear(&mut sandbox, a, EquipmentSlot::Head, "Gills");
        manager.sweep(&registry, &mut sandbox, 1, false);
        sandbox.kill(a);
        let report = manager.sweep(&registry, &mut sandbox, 2, false);
        assert_eq!(report.actors_updated, 0);
        assert_eq!(manager.count_for(a), 1);
    }

    #[test]
    fn test_failing_machine_does_not_stop_others() {
        let table = armor_table();
        let mut registry = MachineRegistry::new();
        registry.register("Night Sight", rejected, &table).unwrap();
        let gills = machines::factory(ArmorSpell::Gills).unwrap();
        registry.register("Gills", gills, &table).unwrap();

        let mut manager = MachineManager::new();
        let mut sandbox = Sandbox::new();
        let a = sandbox.spawn("a", Vec3::ZERO);
        let b = sandbox.spawn("b", Vec3::X);
        wear(&mut sandbox, a, EquipmentSlot::Head, "Night Sight");
        wear(&mut sandbox, a, EquipmentSlot::Feet, "Gills");
        wear(&mut sandbox, b, EquipmentSlot::Chest, "Gills");

        let report = manager.sweep(&registry, &mut sandbox, 1, false);
        assert_eq!(report.machines_created, 3);
        assert_eq!(report.failures, 0);

        let report = manager.sweep(&registry, &mut sandbox, 2, false);
        assert_eq!(report.failures, 1);
        assert_eq!(report.actors_updated, 2);
        // The failing slot neither stops its own actor's other slots nor other actors
        assert!(sandbox.has_status(a, StatusKind::WaterBreathing));
        assert!(sandbox.has_status(b, StatusKind::WaterBreathing));
        assert_eq!(manager.count_for(a), 2);
    }
}
