//! Per-category effect registries
//!
//! Each registry maps a base label to the activation of its spell. Registries
//! are built once from the exhaustive wiring functions in [`crate::combat`] and
//! are read-only afterwards.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use super::kinds::{
    ArmorSpell, BowBlockSpell, BowHitSpell, BowReleaseSpell, SpellKind, ToolSpell, WeaponSpell,
};
use crate::combat::bow::{BowBlockEvent, BowReleaseEvent};
use crate::combat::context::EffectCtx;
use crate::combat::event::{CombatEvent, Summary};
use crate::combat::tool::MiningEvent;
use crate::combat::{armor, bow, tool, weapon};
use crate::error::{CatalogError, EffectError};

/// Weapon and bow-hit spells; returns extra damage
pub type HitActivation =
    fn(&mut EffectCtx<'_>, &mut CombatEvent, u8, &mut Summary) -> Result<f32, EffectError>;

/// Spells that only cause side effects on an event of type `E`
pub type SideEffect<E> =
    fn(&mut EffectCtx<'_>, &mut E, u8, &mut Summary) -> Result<(), EffectError>;

/// Armor spells reacting to a hit
pub type ArmorActivation = SideEffect<CombatEvent>;

pub type ReleaseActivation = SideEffect<BowReleaseEvent>;

pub type BlockActivation = SideEffect<BowBlockEvent>;

pub type ToolActivation = SideEffect<MiningEvent>;

/// Base label -> (kind, activation) for one category
#[derive(Clone)]
pub struct Registry<K, A> {
    entries: HashMap<&'static str, (K, A)>,
}

impl<K: fmt::Debug, A> fmt::Debug for Registry<K, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.entries.values().map(|(kind, _)| kind))
            .finish()
    }
}

impl<K, A> Default for Registry<K, A> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: SpellKind, A: Copy> Registry<K, A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an activation. A label can only be registered once.
    pub fn register(&mut self, kind: K, activation: A) -> Result<(), CatalogError> {
        let label = kind.label();
        if self.entries.contains_key(label) {
            return Err(CatalogError::DuplicateLabel {
                category: K::CATEGORY.name(),
                label: label.to_string(),
            });
        }
        self.entries.insert(label, (kind, activation));
        Ok(())
    }

    /// Register every kind that `wire` attaches an activation to
    pub fn wired(wire: impl Fn(K) -> Option<A>) -> Result<Self, CatalogError> {
        let mut registry = Self::new();
        for &kind in K::all() {
            if let Some(activation) = wire(kind) {
                registry.register(kind, activation)?;
            }
        }
        debug!(
            "{} registry holds {} activations",
            K::CATEGORY.name(),
            registry.len()
        );
        Ok(registry)
    }

    /// Activation for a base label; misses are `None`
    pub fn lookup(&self, label: &str) -> Option<(K, A)> {
        self.entries.get(label).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All six activation registries
#[derive(Debug, Clone)]
pub struct EffectRegistries {
    pub weapon: Registry<WeaponSpell, HitActivation>,
    pub armor: Registry<ArmorSpell, ArmorActivation>,
    pub bow_hit: Registry<BowHitSpell, HitActivation>,
    pub bow_release: Registry<BowReleaseSpell, ReleaseActivation>,
    pub bow_block: Registry<BowBlockSpell, BlockActivation>,
    pub tool: Registry<ToolSpell, ToolActivation>,
}

impl EffectRegistries {
    pub fn build() -> Result<Self, CatalogError> {
        Ok(Self {
            weapon: Registry::wired(|k| Some(weapon::activation(k)))?,
            armor: Registry::wired(armor::activation)?,
            bow_hit: Registry::wired(|k| Some(weapon::bow_activation(k)))?,
            bow_release: Registry::wired(|k| Some(bow::release_activation(k)))?,
            bow_block: Registry::wired(|k| Some(bow::block_activation(k)))?,
            tool: Registry::wired(|k| Some(tool::activation(k)))?,
        })
    }

    /// Hit registry for melee or projectile hits
    pub fn hit(&self, caused_by_projectile: bool) -> HitLookup<'_> {
        if caused_by_projectile {
            HitLookup::Bow(&self.bow_hit)
        } else {
            HitLookup::Melee(&self.weapon)
        }
    }
}

/// The registry the attacker side of a hit reads from
#[derive(Debug, Clone, Copy)]
pub enum HitLookup<'a> {
    Melee(&'a Registry<WeaponSpell, HitActivation>),
    Bow(&'a Registry<BowHitSpell, HitActivation>),
}

impl HitLookup<'_> {
    pub fn get(&self, label: &str) -> Option<HitActivation> {
        match self {
            Self::Melee(r) => r.lookup(label).map(|(_, a)| a),
            Self::Bow(r) => r.lookup(label).map(|(_, a)| a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_hit_spell_is_wired() {
        let registries = EffectRegistries::build().unwrap();
        assert_eq!(registries.weapon.len(), WeaponSpell::all().len());
        assert_eq!(registries.bow_hit.len(), BowHitSpell::all().len());
        assert_eq!(registries.bow_release.len(), BowReleaseSpell::all().len());
        assert_eq!(registries.bow_block.len(), BowBlockSpell::all().len());
        assert_eq!(registries.tool.len(), ToolSpell::all().len());
    }

    #[test]
    fn test_reflect_and_machines_not_in_armor_registry() {
        let registries = EffectRegistries::build().unwrap();
        assert!(!registries.armor.contains(ArmorSpell::Reflect.label()));
        assert!(!registries.armor.contains(ArmorSpell::FrostAura.label()));
        assert!(registries.armor.contains(ArmorSpell::Evasion.label()));
    }

    #[test]
    fn test_duplicate_registration_is_fatal() {
        let mut registry: Registry<WeaponSpell, HitActivation> = Registry::new();
        let lightning = weapon::activation(WeaponSpell::Lightning);
        registry.register(WeaponSpell::Lightning, lightning).unwrap();
        let err = registry
            .register(WeaponSpell::Lightning, lightning)
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicateLabel {
                category: "weapon",
                label: "Lightning ".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_label_misses() {
        let registries = EffectRegistries::build().unwrap();
        assert!(registries.weapon.lookup("Nonsense ").is_none());
        assert!(registries.hit(true).get("Cleave ").is_none());
        assert!(registries.hit(false).get("Cleave ").is_some());
    }
}
