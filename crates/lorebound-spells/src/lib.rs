//! Lorebound Spells - Item enchantment spell engine
//!
//! Items carry spells as lore lines ("Lightning II"). This crate provides:
//! - The lore codec and the immutable spell tables with weighted selection
//! - Closed per-category registries from label to activation
//! - The per-hit combat pipeline, including Reflect and Corruption
//! - Continuous armor machines reconciled against equipment every tick
//! - Cooldowns and deferred tasks driven by the tick clock
//!
//! The game world is reached only through the [`Host`] traits; [`Sandbox`] is
//! an in-memory host for tests and the demo binary.

pub mod combat;
pub mod config;
pub mod continuous;
pub mod engine;
pub mod error;
pub mod host;
pub mod sandbox;
pub mod spell;

pub use combat::{EquipmentSlot, HitOutcome, Item, ItemKind, StatusKind};
pub use config::EngineConfig;
pub use engine::{
    EngineContext, MiningOutcome, ReleaseOutcome, RemovalReport, SpellEngine, TickReport,
};
pub use error::{CatalogError, CodecError, EffectError, EnchantError, HostError, SelectionError};
pub use host::{ActorDirectory, EquipmentStore, Host, PresentationSink, WorldEffects};
pub use sandbox::Sandbox;
