//! Lorebound - spell engine arena
//!
//! Enchants a small cast of actors, runs a scripted skirmish through the spell
//! engine in the in-memory sandbox, and prints a JSON report of the outcome.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lorebound_core::{ActorId, Vec3};
use lorebound_spells::combat::tool::ItemDrop;
use lorebound_spells::sandbox::{SandboxActor, WorldAction};
use lorebound_spells::{
    ActorDirectory, EngineConfig, EquipmentSlot, HitOutcome, Item, ItemKind, RemovalReport,
    Sandbox, SpellEngine,
};

/// Seconds the skirmish lasts at most
const ROUNDS: u32 = 12;
/// Cast tier used for every enchant
const CAST_TIER: u8 = 4;

#[derive(Debug, Serialize)]
struct Enchantment {
    actor: String,
    slot: &'static str,
    token: String,
}

#[derive(Debug, Serialize)]
struct Round {
    tick: u64,
    melee: HitOutcome,
    arrow: Option<HitOutcome>,
    mined: Vec<ItemDrop>,
    machines: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ArenaReport<'a> {
    seed: Option<u64>,
    enchantments: Vec<Enchantment>,
    rounds: Vec<Round>,
    actors: Vec<&'a SandboxActor>,
    messages: Vec<(String, String)>,
    world: &'a [WorldAction],
    removals: Vec<(String, RemovalReport)>,
}

/// Equip a blank item and enchant it `times` times, logging failures
fn outfit(
    engine: &mut SpellEngine,
    sandbox: &mut Sandbox,
    actor: ActorId,
    slot: EquipmentSlot,
    item: Item,
    times: usize,
    log: &mut Vec<Enchantment>,
) {
    let name = sandbox
        .actor(actor)
        .map(|a| a.name.clone())
        .unwrap_or_default();
    sandbox.equip(actor, slot, item);
    for _ in 0..times {
        match engine.enchant(sandbox, actor, slot, CAST_TIER) {
            Ok(token) => log.push(Enchantment {
                actor: name.clone(),
                slot: slot.name(),
                token,
            }),
            Err(e) => warn!("Could not enchant {name}'s {}: {e}", slot.name()),
        }
    }
}

fn name_of(sandbox: &Sandbox, actor: ActorId) -> String {
    sandbox
        .actor(actor)
        .map(|a| a.name.clone())
        .unwrap_or_else(|| actor.to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Starting Lorebound arena...");

    let config = EngineConfig::load();
    let seed = config.rng_seed;
    let ticks_per_second = config.ticks_per_second;
    let mut engine = SpellEngine::new(config).context("Failed to build spell engine")?;
    let mut sandbox = Sandbox::new();

    let knight = sandbox.spawn("knight", Vec3::ZERO);
    let ranger = sandbox.spawn("ranger", Vec3::new(6.0, 0.0, 0.0));
    let miner = sandbox.spawn("miner", Vec3::new(0.0, 0.0, 12.0));
    sandbox.place_block(Vec3::new(1.0, 0.0, 12.0), "dirt");
    sandbox.place_block(Vec3::new(-1.0, 0.0, 12.0), "gravel");

    let mut enchantments = Vec::new();
    let loadout = [
        (knight, EquipmentSlot::MainHand, Item::new(1, "Iron Sword", ItemKind::Weapon), 3),
        (knight, EquipmentSlot::Chest, Item::new(2, "Iron Chestplate", ItemKind::Armor), 1),
        (knight, EquipmentSlot::Feet, Item::new(3, "Iron Boots", ItemKind::Armor), 1),
        (ranger, EquipmentSlot::MainHand, Item::new(4, "Longbow", ItemKind::Bow), 2),
        (ranger, EquipmentSlot::Head, Item::new(5, "Leather Cap", ItemKind::Armor), 1),
        (miner, EquipmentSlot::MainHand, Item::new(6, "Pickaxe", ItemKind::Tool), 1),
    ];
    for (actor, slot, item, times) in loadout {
        outfit(
            &mut engine,
            &mut sandbox,
            actor,
            slot,
            item,
            times,
            &mut enchantments,
        );
    }

    let mut rounds = Vec::new();
    for _ in 0..ROUNDS {
        if !sandbox.is_alive(knight) || !sandbox.is_alive(ranger) {
            break;
        }

        let melee = engine.on_melee_hit(&mut sandbox, knight, ranger, 4.0);

        let mut arrow = None;
        let aim = match (sandbox.position(ranger), sandbox.position(knight)) {
            (Some(from), Some(to)) => (to - from).normalize_or_zero(),
            _ => Vec3::X,
        };
        if let Some(release) = engine.on_bow_release(&mut sandbox, ranger, aim, 1.0) {
            arrow = Some(engine.on_projectile_hit(
                &mut sandbox,
                Some(ranger),
                knight,
                3.0,
                &release.lore,
            ));
            let landing = sandbox.position(knight).unwrap_or(Vec3::ZERO) + Vec3::X;
            engine.on_projectile_land(&mut sandbox, Some(ranger), &release.lore, landing);
        }

        let mined = engine
            .on_block_broken(
                &mut sandbox,
                miner,
                Vec3::new(0.0, 0.0, 12.0),
                "iron_ore",
                vec![ItemDrop::new("raw_iron", 1)],
            )
            .drops;

        for _ in 0..ticks_per_second {
            engine.tick(&mut sandbox);
        }
        sandbox.step(ticks_per_second, ticks_per_second);

        rounds.push(Round {
            tick: engine.now(),
            melee,
            arrow,
            mined,
            machines: engine
                .active_machine_labels(knight)
                .into_iter()
                .chain(engine.active_machine_labels(ranger))
                .map(str::to_string)
                .collect(),
        });
    }

    let mut removals = Vec::new();
    for actor in [knight, ranger, miner] {
        let name = name_of(&sandbox, actor);
        removals.push((name, engine.remove_actor(&mut sandbox, actor)));
    }

    let messages = sandbox
        .messages
        .iter()
        .map(|(actor, text)| (name_of(&sandbox, *actor), text.clone()))
        .collect();
    let report = ArenaReport {
        seed,
        enchantments,
        rounds,
        actors: sandbox.actors().into_iter().map(|(_, a)| a).collect(),
        messages,
        world: &sandbox.world_log,
        removals,
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize arena report")?
    );
    info!("Arena finished after {} ticks", engine.now());
    Ok(())
}
