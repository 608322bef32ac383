//! The spell engine
//!
//! [`EngineContext`] holds everything built once at startup: configuration,
//! spell tables, activation registries, and machine factories. [`SpellEngine`]
//! owns it together with the mutable runtime state (clock, cooldowns, deferred
//! tasks, continuous machines, RNG) and exposes one entry point per game event.

use lorebound_core::{ActorId, Scheduler, Tick, TickClock, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::combat::bow::{BowBlockEvent, BowReleaseEvent};
use crate::combat::context::EffectCtx;
use crate::combat::equipment::EquipmentSlot;
use crate::combat::event::Summary;
use crate::combat::item::ItemKind;
use crate::combat::pipeline::{self, HitOutcome, HitRequest};
use crate::combat::task::{self, DeferredTask};
use crate::combat::tool::{ItemDrop, MiningEvent};
use crate::config::EngineConfig;
use crate::continuous::{MachineManager, MachineRegistry, SweepReport};
use crate::error::{CatalogError, EnchantError, HostError};
use crate::host::Host;
use crate::spell::catalog::{get_random_spell, SpellCatalog};
use crate::spell::cooldown::CooldownManager;
use crate::spell::kinds::{ArmorSpell, SpellKind};
use crate::spell::registry::EffectRegistries;

/// Immutable engine data, built once
#[derive(Debug)]
pub struct EngineContext {
    pub config: EngineConfig,
    pub catalog: SpellCatalog,
    pub registries: EffectRegistries,
    pub machines: MachineRegistry,
}

impl EngineContext {
    /// Build the tables and registries. Any wiring mistake is fatal.
    pub fn build(config: EngineConfig) -> Result<Self, CatalogError> {
        let catalog = SpellCatalog::build()?;
        let registries = EffectRegistries::build()?;
        let machines = MachineRegistry::build(&catalog.armor)?;

        // Reflect is resolved by the pipeline itself
        for &kind in ArmorSpell::all() {
            let label = kind.label();
            if kind != ArmorSpell::Reflect
                && !registries.armor.contains(label)
                && !machines.contains(label)
            {
                return Err(CatalogError::Unwired(label.to_string()));
            }
        }

        info!(
            "Spell engine ready: {} weapon, {} armor, {} bow, {} tool spells ({} machines)",
            catalog.weapon.len(),
            catalog.armor.len(),
            catalog.bow.len(),
            catalog.tool.len(),
            machines.len()
        );

        Ok(Self {
            config,
            catalog,
            registries,
            machines,
        })
    }
}

/// What one tick did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: Tick,
    pub paused: bool,
    pub cooldowns_cleared: usize,
    pub tasks_fired: usize,
    pub task_failures: usize,
    pub machines: SweepReport,
}

/// What removing an actor cleaned up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemovalReport {
    pub cooldowns: usize,
    pub machines: usize,
    pub tasks: usize,
}

/// Result of releasing a bow
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleaseOutcome {
    /// Lore snapshot the fired arrow carries
    pub lore: Vec<String>,
    pub summary: Vec<String>,
}

/// Result of breaking a block with a tool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MiningOutcome {
    pub drops: Vec<ItemDrop>,
    pub summary: Vec<String>,
}

/// Runtime state plus the immutable context
#[derive(Debug)]
pub struct SpellEngine {
    context: EngineContext,
    clock: TickClock,
    cooldowns: CooldownManager,
    tasks: Scheduler<DeferredTask>,
    machines: MachineManager,
    rng: StdRng,
}

impl SpellEngine {
    pub fn new(config: EngineConfig) -> Result<Self, CatalogError> {
        Ok(Self::with_context(EngineContext::build(config)?))
    }

    pub fn with_context(context: EngineContext) -> Self {
        let tick_config = context.config.tick_config();
        let rng = match context.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            clock: TickClock::new(tick_config),
            cooldowns: CooldownManager::new(tick_config.ticks_per_second),
            tasks: Scheduler::new(),
            machines: MachineManager::new(),
            rng,
            context,
        }
    }

    /// Split into the immutable context and an effect context over `host`
    fn parts<'a>(&'a mut self, host: &'a mut dyn Host) -> (&'a EngineContext, EffectCtx<'a>) {
        let ctx = EffectCtx {
            host,
            cooldowns: &mut self.cooldowns,
            tasks: &mut self.tasks,
            rng: &mut self.rng,
            now: self.clock.now(),
            ticks_per_second: self.clock.ticks_per_second(),
        };
        (&self.context, ctx)
    }

    /// Advance one tick: expire cooldowns, fire due tasks, sweep machines
    pub fn tick(&mut self, host: &mut dyn Host) -> TickReport {
        let Some(now) = self.clock.advance() else {
            return TickReport {
                tick: self.clock.now(),
                paused: true,
                ..Default::default()
            };
        };

        let cooldowns_cleared = self.cooldowns.sweep(now, |a| host.is_valid(a));

        let tasks = task::run_due(&mut self.tasks, host, now);

        let machines = self.machines.sweep(
            &self.context.machines,
            host,
            now,
            self.context.config.announce_duplicates,
        );

        TickReport {
            tick: now,
            paused: false,
            cooldowns_cleared,
            tasks_fired: tasks.fired,
            task_failures: tasks.failures,
            machines,
        }
    }

    /// A melee hit; the attacker's main-hand weapon lore applies
    pub fn on_melee_hit(
        &mut self,
        host: &mut dyn Host,
        attacker: ActorId,
        defender: ActorId,
        damage: f32,
    ) -> HitOutcome {
        let lore = match host.item(attacker, EquipmentSlot::MainHand) {
            Some(item) if item.kind == ItemKind::Weapon => item.lore,
            _ => Vec::new(),
        };
        let (context, mut ctx) = self.parts(host);
        pipeline::resolve_hit(
            &context.registries,
            &mut ctx,
            HitRequest {
                attacker: Some(attacker),
                defender,
                damage,
                caused_by_projectile: false,
                lore: &lore,
            },
        )
    }

    /// An arrow hit; `bow_lore` is the snapshot taken at release
    pub fn on_projectile_hit(
        &mut self,
        host: &mut dyn Host,
        shooter: Option<ActorId>,
        defender: ActorId,
        damage: f32,
        bow_lore: &[String],
    ) -> HitOutcome {
        let (context, mut ctx) = self.parts(host);
        pipeline::resolve_hit(
            &context.registries,
            &mut ctx,
            HitRequest {
                attacker: shooter,
                defender,
                damage,
                caused_by_projectile: true,
                lore: bow_lore,
            },
        )
    }

    /// A bow was released. `None` unless the shooter holds a bow.
    pub fn on_bow_release(
        &mut self,
        host: &mut dyn Host,
        shooter: ActorId,
        direction: Vec3,
        power: f32,
    ) -> Option<ReleaseOutcome> {
        let bow = host
            .item(shooter, EquipmentSlot::MainHand)
            .filter(|i| i.kind == ItemKind::Bow)?;
        let corrupted = host.is_corrupted(shooter);

        let mut event = BowReleaseEvent {
            shooter,
            lore: bow.lore,
            direction,
            power,
        };
        let mut out = Summary::new();
        if corrupted {
            debug!("{shooter} is corrupted, skipping bow release lore");
        } else {
            let lore = event.lore.clone();
            let (context, mut ctx) = self.parts(host);
            pipeline::dispatch_lore(
                &context.registries.bow_release,
                &mut ctx,
                &mut event,
                &lore,
                &mut out,
            );
            if !out.is_empty() {
                ctx.host.show(shooter, &out.render());
            }
        }

        Some(ReleaseOutcome {
            lore: event.lore,
            summary: out.lines().to_vec(),
        })
    }

    /// An arrow landed in a block
    pub fn on_projectile_land(
        &mut self,
        host: &mut dyn Host,
        shooter: Option<ActorId>,
        bow_lore: &[String],
        impact: Vec3,
    ) -> Vec<String> {
        if shooter.is_some_and(|s| host.is_corrupted(s)) {
            return Vec::new();
        }
        let mut event = BowBlockEvent { shooter, impact };
        let mut out = Summary::new();
        let (context, mut ctx) = self.parts(host);
        pipeline::dispatch_lore(
            &context.registries.bow_block,
            &mut ctx,
            &mut event,
            bow_lore,
            &mut out,
        );
        if let Some(shooter) = shooter {
            if !out.is_empty() {
                ctx.host.show(shooter, &out.render());
            }
        }
        out.lines().to_vec()
    }

    /// A block was broken. Tool lore may rewrite or add to `drops`.
    pub fn on_block_broken(
        &mut self,
        host: &mut dyn Host,
        miner: ActorId,
        position: Vec3,
        block: &str,
        drops: Vec<ItemDrop>,
    ) -> MiningOutcome {
        let lore = match host.item(miner, EquipmentSlot::MainHand) {
            Some(item) if item.kind == ItemKind::Tool => item.lore,
            _ => Vec::new(),
        };
        let mut event = MiningEvent {
            miner,
            position,
            block: block.to_string(),
            drops,
        };
        let mut out = Summary::new();
        if !lore.is_empty() && !host.is_corrupted(miner) {
            let (context, mut ctx) = self.parts(host);
            pipeline::dispatch_lore(
                &context.registries.tool,
                &mut ctx,
                &mut event,
                &lore,
                &mut out,
            );
            if !out.is_empty() {
                ctx.host.show(miner, &out.render());
            }
        }
        MiningOutcome {
            drops: event.drops,
            summary: out.lines().to_vec(),
        }
    }

    /// Roll a spell onto the item in `slot`.
    ///
    /// Items whose kind carries a single line have that line replaced; others
    /// grow until their ceiling and then refuse with [`EnchantError::LoreFull`].
    pub fn enchant(
        &mut self,
        host: &mut dyn Host,
        actor: ActorId,
        slot: EquipmentSlot,
        cast_tier: u8,
    ) -> Result<String, EnchantError> {
        if !host.is_valid(actor) {
            return Err(HostError::UnknownActor(actor).into());
        }
        let item = host.item(actor, slot).ok_or(EnchantError::EmptySlot)?;
        let table = self
            .context
            .catalog
            .for_item(item.kind)
            .ok_or(EnchantError::NotEnchantable)?;

        let replacing = item.kind.max_lore_lines() == 1 && !item.lore.is_empty();
        if !replacing && !item.has_lore_room() {
            return Err(EnchantError::LoreFull(item.lore.len()));
        }

        let token = get_random_spell(
            table,
            &item.lore,
            cast_tier,
            &mut self.rng,
            self.context.config.selection_retries,
        )?;

        let mut lore = if replacing { Vec::new() } else { item.lore };
        lore.push(token.clone());
        host.set_lore(actor, slot, lore)?;
        info!("{actor} enchanted {} with {token:?}", item.name);
        Ok(token)
    }

    /// Strip every spell from the item in `slot`
    pub fn clear_lore(
        &mut self,
        host: &mut dyn Host,
        actor: ActorId,
        slot: EquipmentSlot,
    ) -> Result<(), EnchantError> {
        if host.item(actor, slot).is_none() {
            return Err(EnchantError::EmptySlot);
        }
        host.set_lore(actor, slot, Vec::new())?;
        Ok(())
    }

    /// Forget everything keyed to an actor that left the game
    pub fn remove_actor(&mut self, host: &mut dyn Host, actor: ActorId) -> RemovalReport {
        let cooldowns = self.cooldowns.remove_actor(actor);
        let machines = self.machines.remove_actor(host, actor);
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.involves(actor));
        let tasks = before - self.tasks.len();

        info!(
            "Removed {actor}: {cooldowns} cooldowns, {machines} machines, {tasks} tasks"
        );
        RemovalReport {
            cooldowns,
            machines,
            tasks,
        }
    }

    /// Labels of the machines running for an actor
    pub fn active_machine_labels(&self, actor: ActorId) -> Vec<&str> {
        self.machines.active_labels(actor)
    }

    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    pub fn cooldowns(&self) -> &CooldownManager {
        &self.cooldowns
    }

    pub fn machines(&self) -> &MachineManager {
        &self.machines
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn now(&self) -> Tick {
        self.clock.now()
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }
}
