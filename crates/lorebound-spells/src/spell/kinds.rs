//! The closed set of spells per category
//!
//! Each category is an enum; the label is the lore text that identifies it.
//! Tiered spells end their label with a space so the numeral can follow.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Which table a spell belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Weapon,
    Armor,
    BowHit,
    BowRelease,
    BowBlock,
    Tool,
}

impl Category {
    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::BowHit => "bow-hit",
            Self::BowRelease => "bow-release",
            Self::BowBlock => "bow-block",
            Self::Tool => "mining-tool",
        }
    }
}

/// Shared behaviour of the per-category spell enums
pub trait SpellKind: Copy + Eq + Hash + Debug + 'static {
    const CATEGORY: Category;

    /// Every variant, in catalog order
    fn all() -> &'static [Self];

    /// Lore label without tier suffix
    fn label(self) -> &'static str;

    /// Token tier granted at cast tiers 1..=5, or `None` for untiered spells
    fn tiers(self) -> Option<[u8; 5]>;

    /// Relative roll weight
    fn weight(self) -> u32;

    /// Look up a variant by its base label
    fn from_label(label: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.label() == label)
    }
}

/// Spells on melee weapons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponSpell {
    Lightning,
    Inferno,
    Venom,
    Frostbite,
    Lifesteal,
    Gust,
    Executioner,
    Cleave,
    Corruption,
}

impl SpellKind for WeaponSpell {
    const CATEGORY: Category = Category::Weapon;

    fn all() -> &'static [Self] {
        &[
            Self::Lightning,
            Self::Inferno,
            Self::Venom,
            Self::Frostbite,
            Self::Lifesteal,
            Self::Gust,
            Self::Executioner,
            Self::Cleave,
            Self::Corruption,
        ]
    }

    fn label(self) -> &'static str {
        match self {
            Self::Lightning => "Lightning ",
            Self::Inferno => "Inferno ",
            Self::Venom => "Venom ",
            Self::Frostbite => "Frostbite ",
            Self::Lifesteal => "Lifesteal ",
            Self::Gust => "Gust ",
            Self::Executioner => "Executioner ",
            Self::Cleave => "Cleave ",
            Self::Corruption => "Corruption",
        }
    }

    fn tiers(self) -> Option<[u8; 5]> {
        match self {
            Self::Lightning => Some([1, 1, 2, 2, 3]),
            Self::Inferno => Some([1, 2, 2, 3, 4]),
            Self::Venom => Some([1, 1, 2, 3, 3]),
            Self::Frostbite => Some([1, 2, 2, 3, 3]),
            Self::Lifesteal => Some([0, 1, 1, 2, 3]),
            Self::Gust => Some([1, 1, 2, 2, 2]),
            Self::Executioner => Some([0, 0, 1, 2, 3]),
            Self::Cleave => Some([0, 1, 2, 2, 3]),
            Self::Corruption => None,
        }
    }

    fn weight(self) -> u32 {
        match self {
            Self::Lightning => 10,
            Self::Inferno => 12,
            Self::Venom => 12,
            Self::Frostbite => 10,
            Self::Lifesteal => 6,
            Self::Gust => 12,
            Self::Executioner => 4,
            Self::Cleave => 6,
            Self::Corruption => 2,
        }
    }
}

/// Spells on armor pieces; some react to hits, others run as continuous machines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArmorSpell {
    Reflect,
    Evasion,
    Thorns,
    Fortify,
    Rejuvenation,
    FrostAura,
    Momentum,
    NightSight,
    Gills,
    FireWard,
    Vitality,
}

impl SpellKind for ArmorSpell {
    const CATEGORY: Category = Category::Armor;

    fn all() -> &'static [Self] {
        &[
            Self::Reflect,
            Self::Evasion,
            Self::Thorns,
            Self::Fortify,
            Self::Rejuvenation,
            Self::FrostAura,
            Self::Momentum,
            Self::NightSight,
            Self::Gills,
            Self::FireWard,
            Self::Vitality,
        ]
    }

    fn label(self) -> &'static str {
        match self {
            Self::Reflect => "Reflect ",
            Self::Evasion => "Evasion ",
            Self::Thorns => "Thorns ",
            Self::Fortify => "Fortify ",
            Self::Rejuvenation => "Rejuvenation ",
            Self::FrostAura => "Frost Aura ",
            Self::Momentum => "Momentum ",
            Self::NightSight => "Night Sight",
            Self::Gills => "Gills",
            Self::FireWard => "Fire Ward",
            Self::Vitality => "Vitality ",
        }
    }

    fn tiers(self) -> Option<[u8; 5]> {
        match self {
            Self::Reflect => Some([0, 1, 1, 2, 3]),
            Self::Evasion => Some([1, 1, 2, 2, 3]),
            Self::Thorns => Some([1, 2, 2, 3, 4]),
            Self::Fortify => Some([1, 1, 2, 2, 3]),
            Self::Rejuvenation => Some([0, 1, 1, 2, 2]),
            Self::FrostAura => Some([0, 0, 1, 1, 2]),
            Self::Momentum => Some([1, 1, 2, 2, 3]),
            Self::NightSight | Self::Gills | Self::FireWard => None,
            Self::Vitality => Some([1, 1, 2, 2, 3]),
        }
    }

    fn weight(self) -> u32 {
        match self {
            Self::Reflect => 4,
            Self::Evasion => 8,
            Self::Thorns => 10,
            Self::Fortify => 10,
            Self::Rejuvenation => 6,
            Self::FrostAura => 4,
            Self::Momentum => 8,
            Self::NightSight => 10,
            Self::Gills => 10,
            Self::FireWard => 6,
            Self::Vitality => 8,
        }
    }
}

/// Bow spells that fire when an arrow hits an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BowHitSpell {
    Lightning,
    Sharpshot,
    Venom,
    Ensnare,
}

impl SpellKind for BowHitSpell {
    const CATEGORY: Category = Category::BowHit;

    fn all() -> &'static [Self] {
        &[Self::Lightning, Self::Sharpshot, Self::Venom, Self::Ensnare]
    }

    fn label(self) -> &'static str {
        match self {
            Self::Lightning => "Lightning ",
            Self::Sharpshot => "Sharpshot ",
            Self::Venom => "Venom ",
            Self::Ensnare => "Ensnare ",
        }
    }

    fn tiers(self) -> Option<[u8; 5]> {
        match self {
            Self::Lightning => Some([1, 1, 2, 2, 3]),
            Self::Sharpshot => Some([1, 2, 3, 4, 5]),
            Self::Venom => Some([1, 1, 2, 3, 3]),
            Self::Ensnare => Some([0, 1, 1, 2, 2]),
        }
    }

    fn weight(self) -> u32 {
        match self {
            Self::Lightning => 8,
            Self::Sharpshot => 14,
            Self::Venom => 10,
            Self::Ensnare => 6,
        }
    }
}

/// Bow spells that fire when the bow is released
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BowReleaseSpell {
    Volley,
    Recoil,
    Quickdraw,
}

impl SpellKind for BowReleaseSpell {
    const CATEGORY: Category = Category::BowRelease;

    fn all() -> &'static [Self] {
        &[Self::Volley, Self::Recoil, Self::Quickdraw]
    }

    fn label(self) -> &'static str {
        match self {
            Self::Volley => "Volley ",
            Self::Recoil => "Recoil ",
            Self::Quickdraw => "Quickdraw ",
        }
    }

    fn tiers(self) -> Option<[u8; 5]> {
        match self {
            Self::Volley => Some([0, 1, 1, 2, 2]),
            Self::Recoil => Some([1, 1, 2, 2, 3]),
            Self::Quickdraw => Some([1, 1, 1, 2, 2]),
        }
    }

    fn weight(self) -> u32 {
        match self {
            Self::Volley => 6,
            Self::Recoil => 8,
            Self::Quickdraw => 8,
        }
    }
}

/// Bow spells that fire when an arrow lands in a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BowBlockSpell {
    Ender,
    Blast,
    Kindle,
}

impl SpellKind for BowBlockSpell {
    const CATEGORY: Category = Category::BowBlock;

    fn all() -> &'static [Self] {
        &[Self::Ender, Self::Blast, Self::Kindle]
    }

    fn label(self) -> &'static str {
        match self {
            Self::Ender => "Ender",
            Self::Blast => "Blast ",
            Self::Kindle => "Kindle",
        }
    }

    fn tiers(self) -> Option<[u8; 5]> {
        match self {
            Self::Ender => None,
            Self::Blast => Some([0, 0, 1, 1, 2]),
            Self::Kindle => None,
        }
    }

    fn weight(self) -> u32 {
        match self {
            Self::Ender => 4,
            Self::Blast => 4,
            Self::Kindle => 8,
        }
    }
}

/// Spells on pickaxes and other mining tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolSpell {
    Smelting,
    Excavation,
    Prospector,
    Haste,
}

impl SpellKind for ToolSpell {
    const CATEGORY: Category = Category::Tool;

    fn all() -> &'static [Self] {
        &[Self::Smelting, Self::Excavation, Self::Prospector, Self::Haste]
    }

    fn label(self) -> &'static str {
        match self {
            Self::Smelting => "Smelting",
            Self::Excavation => "Excavation ",
            Self::Prospector => "Prospector ",
            Self::Haste => "Haste ",
        }
    }

    fn tiers(self) -> Option<[u8; 5]> {
        match self {
            Self::Smelting => None,
            Self::Excavation => Some([0, 1, 1, 2, 2]),
            Self::Prospector => Some([1, 1, 2, 2, 3]),
            Self::Haste => Some([1, 2, 2, 3, 3]),
        }
    }

    fn weight(self) -> u32 {
        match self {
            Self::Smelting => 8,
            Self::Excavation => 5,
            Self::Prospector => 8,
            Self::Haste => 10,
        }
    }
}
