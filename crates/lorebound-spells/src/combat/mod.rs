//! Combat-side spell handling
//!
//! Items and equipment, the per-hit event record, the activations of every
//! event-driven spell category, and the pipeline that dispatches them.

pub mod armor;
pub mod bow;
pub mod context;
pub mod equipment;
pub mod event;
pub mod item;
pub mod pipeline;
pub mod reflect;
pub mod status;
pub mod task;
pub mod tool;
pub mod weapon;

pub use context::EffectCtx;
pub use equipment::{EquipmentSet, EquipmentSlot, ARMOR_SLOTS};
pub use event::{CombatEvent, ReflectCandidate, Summary};
pub use item::{Item, ItemKind};
pub use pipeline::HitOutcome;
pub use status::{StatusEffect, StatusKind, StatusManager};
pub use task::DeferredTask;

#[cfg(test)]
pub(crate) mod testing {
    use lorebound_core::{Scheduler, Tick};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::context::EffectCtx;
    use super::task::DeferredTask;
    use crate::sandbox::Sandbox;
    use crate::spell::cooldown::CooldownManager;

    pub const TPS: u64 = 20;

    /// Owned state behind an `EffectCtx` for handler tests
    pub struct Fixture {
        pub sandbox: Sandbox,
        pub cooldowns: CooldownManager,
        pub tasks: Scheduler<DeferredTask>,
        pub rng: StdRng,
        pub now: Tick,
    }

    impl Fixture {
        pub fn new(seed: u64) -> Self {
            Self {
                sandbox: Sandbox::new(),
                cooldowns: CooldownManager::new(TPS),
                tasks: Scheduler::new(),
                rng: StdRng::seed_from_u64(seed),
                now: 100,
            }
        }

        pub fn ctx(&mut self) -> EffectCtx<'_> {
            EffectCtx {
                host: &mut self.sandbox,
                cooldowns: &mut self.cooldowns,
                tasks: &mut self.tasks,
                rng: &mut self.rng,
                now: self.now,
                ticks_per_second: TPS,
            }
        }
    }
}
