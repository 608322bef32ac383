//! Mutable state handed to every activation

use lorebound_core::{ActorId, Scheduler, TaskHandle, Tick};
use rand::rngs::StdRng;
use rand::Rng;

use super::task::DeferredTask;
use crate::host::Host;
use crate::spell::cooldown::CooldownManager;

/// Borrowed engine state an activation may touch
pub struct EffectCtx<'a> {
    pub host: &'a mut dyn Host,
    pub cooldowns: &'a mut CooldownManager,
    pub tasks: &'a mut Scheduler<DeferredTask>,
    pub rng: &'a mut StdRng,
    pub now: Tick,
    pub ticks_per_second: u64,
}

impl<'a> EffectCtx<'a> {
    /// Whether `actor` may use the spell `label` again
    pub fn ready(&self, actor: ActorId, label: &'static str) -> bool {
        self.cooldowns.is_finished(actor, label)
    }

    pub fn start_cooldown(&mut self, actor: ActorId, label: &'static str, seconds: u32) {
        self.cooldowns.start(actor, label, seconds, self.now);
    }

    /// Whole seconds in ticks
    pub fn seconds(&self, seconds: u32) -> Tick {
        seconds as u64 * self.ticks_per_second
    }

    /// Schedule a one-shot task `seconds` from now
    pub fn after_seconds(&mut self, seconds: u32, task: DeferredTask) -> TaskHandle {
        let delay = self.seconds(seconds);
        self.tasks.after(self.now, delay, task)
    }

    /// Schedule a task every `seconds` from now
    pub fn every_seconds(&mut self, seconds: u32, task: DeferredTask) -> TaskHandle {
        let period = self.seconds(seconds);
        self.tasks.every(self.now, period, task)
    }

    /// Percent roll: true with probability `percent`/100
    pub fn chance(&mut self, percent: u32) -> bool {
        self.rng.gen_range(1..=100) <= percent
    }
}
