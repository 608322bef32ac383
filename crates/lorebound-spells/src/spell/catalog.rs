//! Spell catalog — weighted descriptor tables per category
//!
//! Built once at startup from the spell enums and read-only afterwards.

use std::collections::HashSet;

use rand::Rng;
use serde::Serialize;

use super::codec::{self, MAX_TOKEN_TIER};
use super::kinds::{
    ArmorSpell, BowBlockSpell, BowHitSpell, BowReleaseSpell, Category, SpellKind, ToolSpell,
    WeaponSpell,
};
use super::selector::WeightedTable;
use crate::combat::item::ItemKind;
use crate::error::{CatalogError, SelectionError};

/// Number of cast tiers
pub const CAST_TIERS: usize = 5;

/// Catalog entry for one spell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpellDescriptor {
    pub label: String,
    /// Token tier per cast tier; 0 means not obtainable at that cast tier
    pub tiers: Option<[u8; CAST_TIERS]>,
    pub weight: u32,
    minimum_cast_tier: u8,
}

impl SpellDescriptor {
    /// Validate and build a descriptor
    pub fn new(
        label: impl Into<String>,
        tiers: Option<[u8; CAST_TIERS]>,
        weight: u32,
    ) -> Result<Self, CatalogError> {
        let label = label.into();
        if weight == 0 {
            return Err(CatalogError::ZeroWeight { label });
        }

        let minimum_cast_tier = match tiers {
            None => 1,
            Some(table) => {
                if let Some(&bad) = table.iter().find(|&&t| t > MAX_TOKEN_TIER) {
                    return Err(CatalogError::MalformedTiers {
                        label,
                        reason: format!("tier {bad} cannot be encoded"),
                    });
                }
                if table.iter().all(|&t| t == 0) {
                    return Err(CatalogError::MalformedTiers {
                        label,
                        reason: "never obtainable".to_string(),
                    });
                }
                // Last zero index + 2, i.e. the first cast tier after the last gap
                match table.iter().rposition(|&t| t == 0) {
                    Some(last_zero) => last_zero as u8 + 2,
                    None => 1,
                }
            }
        };

        Ok(Self {
            label,
            tiers,
            weight,
            minimum_cast_tier,
        })
    }

    /// Descriptor for a spell enum variant
    pub fn of<K: SpellKind>(kind: K) -> Result<Self, CatalogError> {
        Self::new(kind.label(), kind.tiers(), kind.weight())
    }

    /// Lowest cast tier at which this spell can be rolled
    pub fn minimum_cast_tier(&self) -> u8 {
        self.minimum_cast_tier
    }

    /// Token tier granted at `cast_tier` (0 for untiered spells)
    pub fn token_tier(&self, cast_tier: u8) -> u8 {
        match (self.tiers, cast_tier) {
            (Some(table), 1..=5) => table[cast_tier as usize - 1],
            _ => 0,
        }
    }
}

/// One category's weighted descriptor table
#[derive(Debug, Clone)]
pub struct SpellTable {
    name: &'static str,
    table: WeightedTable<SpellDescriptor>,
}

impl SpellTable {
    /// Build a table, rejecting duplicate labels
    pub fn new(
        name: &'static str,
        descriptors: Vec<SpellDescriptor>,
    ) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for d in &descriptors {
            if !seen.insert(d.label.clone()) {
                return Err(CatalogError::DuplicateLabel {
                    category: name,
                    label: d.label.clone(),
                });
            }
        }

        let weighted = descriptors
            .into_iter()
            .map(|d| {
                let w = d.weight;
                (d, w)
            })
            .collect();
        let table =
            WeightedTable::new(weighted).map_err(|_| CatalogError::EmptyTable { category: name })?;
        Ok(Self { name, table })
    }

    /// Table built from every variant of a spell enum
    pub fn of<K: SpellKind>() -> Result<Self, CatalogError> {
        let descriptors = K::all()
            .iter()
            .map(|&k| SpellDescriptor::of(k))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(K::CATEGORY.name(), descriptors)
    }

    /// Union of several tables
    pub fn merged(name: &'static str, parts: &[&SpellTable]) -> Result<Self, CatalogError> {
        let descriptors = parts
            .iter()
            .flat_map(|t| t.descriptors().cloned())
            .collect();
        Self::new(name, descriptors)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// All descriptors in table order
    pub fn descriptors(&self) -> impl Iterator<Item = &SpellDescriptor> {
        self.table.iter().map(|(d, _)| d)
    }

    /// Find a descriptor by base label
    pub fn get(&self, label: &str) -> Option<&SpellDescriptor> {
        self.descriptors().find(|d| d.label == label)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Weighted table backing this category
    pub fn weighted(&self) -> &WeightedTable<SpellDescriptor> {
        &self.table
    }
}

/// Roll a lore token from `table`.
///
/// Skips spells whose base label already appears in `already_has` and spells
/// that cannot be obtained at `cast_tier`.
pub fn get_random_spell<R: Rng + ?Sized>(
    table: &SpellTable,
    already_has: &[String],
    cast_tier: u8,
    rng: &mut R,
    max_retries: usize,
) -> Result<String, SelectionError> {
    if !(1..=CAST_TIERS as u8).contains(&cast_tier) {
        return Err(SelectionError::InvalidCastTier(cast_tier));
    }

    let existing: Vec<&str> = already_has.iter().map(|t| codec::base_label(t)).collect();
    let picked = table.weighted().pick(
        rng,
        |d| d.minimum_cast_tier() <= cast_tier && !existing.contains(&d.label.as_str()),
        max_retries,
    )?;

    Ok(codec::encode(&picked.label, picked.token_tier(cast_tier))?)
}

/// Every spell table
#[derive(Debug, Clone)]
pub struct SpellCatalog {
    pub weapon: SpellTable,
    pub armor: SpellTable,
    pub bow_hit: SpellTable,
    pub bow_release: SpellTable,
    pub bow_block: SpellTable,
    pub tool: SpellTable,
    /// Union of the three bow tables, used when enchanting a bow
    pub bow: SpellTable,
}

impl SpellCatalog {
    /// Build all tables from the spell enums
    pub fn build() -> Result<Self, CatalogError> {
        let bow_hit = SpellTable::of::<BowHitSpell>()?;
        let bow_release = SpellTable::of::<BowReleaseSpell>()?;
        let bow_block = SpellTable::of::<BowBlockSpell>()?;
        let bow = SpellTable::merged("bow", &[&bow_hit, &bow_release, &bow_block])?;

        Ok(Self {
            weapon: SpellTable::of::<WeaponSpell>()?,
            armor: SpellTable::of::<ArmorSpell>()?,
            bow_hit,
            bow_release,
            bow_block,
            tool: SpellTable::of::<ToolSpell>()?,
            bow,
        })
    }

    /// Table for a category
    pub fn table(&self, category: Category) -> &SpellTable {
        match category {
            Category::Weapon => &self.weapon,
            Category::Armor => &self.armor,
            Category::BowHit => &self.bow_hit,
            Category::BowRelease => &self.bow_release,
            Category::BowBlock => &self.bow_block,
            Category::Tool => &self.tool,
        }
    }

    /// Table that enchanting an item of `kind` rolls from
    pub fn for_item(&self, kind: ItemKind) -> Option<&SpellTable> {
        match kind {
            ItemKind::Weapon => Some(&self.weapon),
            ItemKind::Armor => Some(&self.armor),
            ItemKind::Bow => Some(&self.bow),
            ItemKind::Tool => Some(&self.tool),
            ItemKind::Other => None,
        }
    }
}
