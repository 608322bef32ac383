//! Deferred spell work run by the tick driver

use std::collections::HashSet;

use lorebound_core::{ActorId, Scheduler, TaskHandle, Tick};
use tracing::{debug, warn};

use crate::error::EffectError;
use crate::host::Host;

/// Work a spell leaves behind for later ticks
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredTask {
    /// Remove a tag, e.g. when Corruption wears off
    ClearTag { actor: ActorId, tag: &'static str },
    /// One pulse of damage over time
    DamagePulse {
        target: ActorId,
        source: Option<ActorId>,
        amount: f32,
    },
    /// Stop another (periodic) task
    Cancel(TaskHandle),
}

impl DeferredTask {
    /// Whether this task touches `actor`
    pub fn involves(&self, actor: ActorId) -> bool {
        match self {
            Self::ClearTag { actor: a, .. } => *a == actor,
            Self::DamagePulse { target, source, .. } => {
                *target == actor || *source == Some(actor)
            }
            Self::Cancel(_) => false,
        }
    }

    /// Execute the task. Actors that are gone or dead turn it into a no-op.
    pub fn run(
        self,
        host: &mut dyn Host,
        scheduler: &mut Scheduler<DeferredTask>,
    ) -> Result<(), EffectError> {
        match self {
            Self::ClearTag { actor, tag } => {
                if !host.is_valid(actor) {
                    debug!("skipping tag clear for missing actor {actor}");
                    return Ok(());
                }
                host.remove_tag(actor, tag)?;
            }
            Self::DamagePulse {
                target,
                source,
                amount,
            } => {
                if !host.is_alive(target) {
                    return Ok(());
                }
                let source = source.filter(|s| host.is_valid(*s));
                host.apply_damage(target, amount, source)?;
            }
            Self::Cancel(handle) => {
                scheduler.cancel(handle);
            }
        }
        Ok(())
    }
}

/// What running one tick's due tasks did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskBatch {
    pub fired: usize,
    pub failures: usize,
}

/// Run every task due at `now`, in registration order.
///
/// A failing task is logged and the rest of the batch still runs. A `Cancel`
/// also stops its target when both fall due in the same batch.
pub fn run_due(
    scheduler: &mut Scheduler<DeferredTask>,
    host: &mut dyn Host,
    now: Tick,
) -> TaskBatch {
    let mut batch = TaskBatch::default();
    let mut cancelled = HashSet::new();
    for (handle, task) in scheduler.drain_due(now) {
        if cancelled.contains(&handle) {
            continue;
        }
        if let DeferredTask::Cancel(target) = &task {
            cancelled.insert(*target);
        }
        batch.fired += 1;
        if let Err(e) = task.run(host, scheduler) {
            warn!("Deferred task failed: {}", e);
            batch.failures += 1;
        }
    }
    batch
}
