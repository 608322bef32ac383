//! Spell data: the lore codec, catalog tables, weighted selection,
//! activation registries, and cooldowns.

pub mod catalog;
pub mod codec;
pub mod cooldown;
pub mod kinds;
pub mod registry;
pub mod selector;

pub use catalog::{get_random_spell, SpellCatalog, SpellDescriptor, SpellTable};
pub use cooldown::CooldownManager;
pub use kinds::{
    ArmorSpell, BowBlockSpell, BowHitSpell, BowReleaseSpell, Category, SpellKind, ToolSpell,
    WeaponSpell,
};
pub use registry::{EffectRegistries, Registry};
pub use selector::WeightedTable;
