//! The continuous armor machines

use lorebound_core::{ActorId, Tick};

use super::{ContinuousEffect, MachineFactory};
use crate::combat::status::StatusKind;
use crate::error::EffectError;
use crate::host::Host;
use crate::spell::kinds::ArmorSpell;

/// Ticks between Frost Aura pulses
pub const FROST_AURA_INTERVAL: Tick = 60;
/// Ticks of sprinting per Momentum level
pub const MOMENTUM_STEP: Tick = 40;
/// Momentum level while not sprinting
pub const MOMENTUM_IDLE: i32 = -1;

/// Length of the statuses refresh machines keep topping up
const REFRESH_TICKS: Tick = 40;
/// Night vision fades visibly below ten seconds
const NIGHT_VISION_TICKS: Tick = 220;

/// Machine factory for an armor spell, if it runs continuously
pub fn factory(spell: ArmorSpell) -> Option<MachineFactory> {
    match spell {
        ArmorSpell::FrostAura => Some(frost_aura as MachineFactory),
        ArmorSpell::Momentum => Some(momentum as MachineFactory),
        ArmorSpell::NightSight => Some(night_sight as MachineFactory),
        ArmorSpell::Gills => Some(gills as MachineFactory),
        ArmorSpell::FireWard => Some(fire_ward as MachineFactory),
        ArmorSpell::Vitality => Some(vitality as MachineFactory),
        ArmorSpell::Reflect
        | ArmorSpell::Evasion
        | ArmorSpell::Thorns
        | ArmorSpell::Fortify
        | ArmorSpell::Rejuvenation => None,
    }
}

fn frost_aura(tier: u8, now: Tick) -> Box<dyn ContinuousEffect> {
    Box::new(FrostAura::new(tier, now))
}

fn momentum(tier: u8, _now: Tick) -> Box<dyn ContinuousEffect> {
    Box::new(Momentum::new(tier))
}

fn night_sight(_tier: u8, _now: Tick) -> Box<dyn ContinuousEffect> {
    Box::new(StatusRefresh::new(StatusKind::NightVision, 0, NIGHT_VISION_TICKS))
}

fn gills(_tier: u8, _now: Tick) -> Box<dyn ContinuousEffect> {
    Box::new(StatusRefresh::new(StatusKind::WaterBreathing, 0, REFRESH_TICKS))
}

fn fire_ward(_tier: u8, _now: Tick) -> Box<dyn ContinuousEffect> {
    Box::new(StatusRefresh::new(StatusKind::FireResistance, 0, REFRESH_TICKS))
}

fn vitality(tier: u8, _now: Tick) -> Box<dyn ContinuousEffect> {
    Box::new(StatusRefresh::new(
        StatusKind::HealthBoost,
        tier.saturating_sub(1),
        REFRESH_TICKS,
    ))
}

/// Periodically slows everyone around the wearer
#[derive(Debug, Clone)]
pub struct FrostAura {
    tier: u8,
    last_activation: Tick,
}

impl FrostAura {
    pub fn new(tier: u8, now: Tick) -> Self {
        Self {
            tier,
            last_activation: now,
        }
    }

    pub fn radius(&self) -> f32 {
        3.0 + self.tier as f32
    }
}

impl ContinuousEffect for FrostAura {
    fn update(
        &mut self,
        host: &mut dyn Host,
        actor: ActorId,
        now: Tick,
        corrupted: bool,
    ) -> Result<(), EffectError> {
        if corrupted || self.tier == 0 {
            return Ok(());
        }
        if now.saturating_sub(self.last_activation) < FROST_AURA_INTERVAL {
            return Ok(());
        }
        self.last_activation = now;

        let Some(center) = host.position(actor) else {
            return Ok(());
        };
        for other in host.actors_near(center, self.radius()) {
            if other == actor {
                continue;
            }
            host.apply_status(
                other,
                StatusKind::Slowness,
                FROST_AURA_INTERVAL,
                self.tier - 1,
            )?;
        }
        Ok(())
    }

    fn remove(&mut self, _host: &mut dyn Host, _actor: ActorId) -> Result<(), EffectError> {
        Ok(())
    }
}

/// Speed that builds up while sprinting
#[derive(Debug, Clone)]
pub struct Momentum {
    cap: u8,
    level: i32,
    last_step: Tick,
}

impl Momentum {
    pub fn new(tier: u8) -> Self {
        Self {
            cap: tier,
            level: MOMENTUM_IDLE,
            last_step: 0,
        }
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    fn reset(&mut self, host: &mut dyn Host, actor: ActorId) -> Result<(), EffectError> {
        if self.level != MOMENTUM_IDLE {
            self.level = MOMENTUM_IDLE;
            host.remove_status(actor, StatusKind::Speed)?;
        }
        Ok(())
    }
}

impl ContinuousEffect for Momentum {
    fn update(
        &mut self,
        host: &mut dyn Host,
        actor: ActorId,
        now: Tick,
        corrupted: bool,
    ) -> Result<(), EffectError> {
        if corrupted || self.cap == 0 || !host.is_sprinting(actor) {
            return self.reset(host, actor);
        }

        if self.level == MOMENTUM_IDLE {
            self.level = 0;
            self.last_step = now;
        } else if now.saturating_sub(self.last_step) >= MOMENTUM_STEP
            && self.level < self.cap as i32 - 1
        {
            self.level += 1;
            self.last_step = now;
        }
        host.apply_status(actor, StatusKind::Speed, REFRESH_TICKS, self.level as u8)?;
        Ok(())
    }

    fn remove(&mut self, host: &mut dyn Host, actor: ActorId) -> Result<(), EffectError> {
        self.reset(host, actor)
    }
}

/// Keeps a status topped up while worn
#[derive(Debug, Clone)]
pub struct StatusRefresh {
    kind: StatusKind,
    amplifier: u8,
    duration: Tick,
    suppressed: bool,
}

impl StatusRefresh {
    pub fn new(kind: StatusKind, amplifier: u8, duration: Tick) -> Self {
        Self {
            kind,
            amplifier,
            duration,
            suppressed: false,
        }
    }
}

impl ContinuousEffect for StatusRefresh {
    fn update(
        &mut self,
        host: &mut dyn Host,
        actor: ActorId,
        _now: Tick,
        corrupted: bool,
    ) -> Result<(), EffectError> {
        if corrupted {
            if !self.suppressed {
                self.suppressed = true;
                host.remove_status(actor, self.kind)?;
            }
            return Ok(());
        }
        self.suppressed = false;
        host.apply_status(actor, self.kind, self.duration, self.amplifier)?;
        Ok(())
    }

    fn remove(&mut self, host: &mut dyn Host, actor: ActorId) -> Result<(), EffectError> {
        host.remove_status(actor, self.kind)?;
        Ok(())
    }
}
