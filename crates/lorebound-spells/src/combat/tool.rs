//! Mining-tool activations

use lorebound_core::{ActorId, Vec3};
use serde::Serialize;
use tracing::debug;

use super::context::EffectCtx;
use super::event::Summary;
use super::status::StatusKind;
use crate::error::EffectError;
use crate::spell::kinds::{SpellKind, ToolSpell};
use crate::spell::registry::ToolActivation;
use crate::spell::selector::WeightedTable;

/// Items a broken block yields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemDrop {
    pub item: String,
    pub count: u32,
}

impl ItemDrop {
    pub fn new(item: impl Into<String>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
        }
    }
}

/// A block was broken with a tool
#[derive(Debug, Clone, PartialEq)]
pub struct MiningEvent {
    pub miner: ActorId,
    pub position: Vec3,
    pub block: String,
    /// What the block yields; spells may rewrite or extend this
    pub drops: Vec<ItemDrop>,
}

/// Blocks soft enough for Excavation to dig around
const SOFT_BLOCKS: &[&str] = &["dirt", "grass_block", "gravel", "sand", "clay"];

/// Neighbours Excavation clears, nearest first
const EXCAVATION_OFFSETS: [Vec3; 6] = [
    Vec3::new(0.0, -1.0, 0.0),
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(-1.0, 0.0, 0.0),
    Vec3::new(0.0, 0.0, 1.0),
    Vec3::new(0.0, 0.0, -1.0),
    Vec3::new(0.0, 1.0, 0.0),
];

/// Bonus drop Prospector can find, with base weights
const PROSPECTOR_FINDS: &[(&str, u32)] = &[
    ("coal", 50),
    ("raw_iron", 25),
    ("raw_gold", 10),
    ("lapis_lazuli", 10),
    ("diamond", 1),
];

pub fn activation(spell: ToolSpell) -> ToolActivation {
    match spell {
        ToolSpell::Smelting => smelting,
        ToolSpell::Excavation => excavation,
        ToolSpell::Prospector => prospector,
        ToolSpell::Haste => haste,
    }
}

/// Result of smelting an item, if it smelts
pub fn smelted(item: &str) -> Option<&'static str> {
    match item {
        "raw_iron" | "iron_ore" => Some("iron_ingot"),
        "raw_gold" | "gold_ore" => Some("gold_ingot"),
        "raw_copper" | "copper_ore" => Some("copper_ingot"),
        "sand" => Some("glass"),
        "cobblestone" => Some("stone"),
        "clay_ball" => Some("brick"),
        _ => None,
    }
}

fn smelting(
    _ctx: &mut EffectCtx<'_>,
    event: &mut MiningEvent,
    _tier: u8,
    out: &mut Summary,
) -> Result<(), EffectError> {
    let mut changed = false;
    for drop in &mut event.drops {
        if let Some(result) = smelted(&drop.item) {
            drop.item = result.to_string();
            changed = true;
        }
    }
    if changed {
        out.push("Smelted");
    }
    Ok(())
}

/// Dig out `2 * tier` soft neighbours of the broken block
fn excavation(
    ctx: &mut EffectCtx<'_>,
    event: &mut MiningEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<(), EffectError> {
    if tier == 0 || !SOFT_BLOCKS.contains(&event.block.as_str()) {
        return Ok(());
    }
    let reach = (2 * tier as usize).min(EXCAVATION_OFFSETS.len());
    let mut dug = 0;
    for offset in &EXCAVATION_OFFSETS[..reach] {
        if let Some(block) = ctx.host.break_block(event.miner, event.position + *offset)? {
            event.drops.push(ItemDrop::new(block, 1));
            dug += 1;
        }
    }
    if dug > 0 {
        out.push(format!("Excavated {dug}"));
    }
    Ok(())
}

fn prospector(
    ctx: &mut EffectCtx<'_>,
    event: &mut MiningEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<(), EffectError> {
    if tier == 0 || !(event.block.ends_with("_ore") || event.block.ends_with("stone")) {
        return Ok(());
    }
    if !ctx.chance(5 * tier as u32) {
        return Ok(());
    }

    let entries = PROSPECTOR_FINDS
        .iter()
        .map(|&(item, weight)| {
            let weight = if item == "diamond" { weight + tier as u32 } else { weight };
            (item, weight)
        })
        .collect();
    let Ok(table) = WeightedTable::new(entries) else {
        return Ok(());
    };
    // Diamonds only turn up for tier II and above
    match table.pick(&mut *ctx.rng, |item| tier >= 2 || *item != "diamond", 10) {
        Ok(&item) => {
            event.drops.push(ItemDrop::new(item, 1));
            out.push(format!("Found {item}"));
        }
        Err(e) => debug!("prospector found nothing: {e}"),
    }
    Ok(())
}

fn haste(
    ctx: &mut EffectCtx<'_>,
    event: &mut MiningEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<(), EffectError> {
    let label = ToolSpell::Haste.label();
    if tier == 0 || !ctx.ready(event.miner, label) {
        return Ok(());
    }
    let duration = ctx.seconds(6);
    ctx.host
        .apply_status(event.miner, StatusKind::Haste, duration, tier - 1)?;
    ctx.start_cooldown(event.miner, label, 12);
    out.push("Haste");
    Ok(())
}
