//! Time system for the Lorebound engine
//!
//! Game time advances in whole ticks. The clock converts effect durations given
//! in seconds into ticks, and the scheduler holds one-shot and periodic tasks
//! that fire against the same tick counter.

use serde::{Deserialize, Serialize};

/// A point on the monotonically increasing tick counter
pub type Tick = u64;

/// Configuration for game time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickConfig {
    /// How many ticks make up one game second
    pub ticks_per_second: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 20,
        }
    }
}

/// Game tick tracking
#[derive(Debug, Clone, Default)]
pub struct TickClock {
    /// Configuration
    pub config: TickConfig,
    /// Ticks elapsed since start
    tick: Tick,
    /// Whether the clock is paused
    pub paused: bool,
}

impl TickClock {
    /// Create a new clock with custom config
    pub fn new(config: TickConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Current tick
    pub fn now(&self) -> Tick {
        self.tick
    }

    /// Advance by one tick. Returns the new tick, or `None` while paused.
    pub fn advance(&mut self) -> Option<Tick> {
        if self.paused {
            return None;
        }
        self.tick += 1;
        Some(self.tick)
    }

    /// Ticks per game second
    pub fn ticks_per_second(&self) -> u64 {
        self.config.ticks_per_second
    }

    /// Pause the clock
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume the clock
    pub fn resume(&mut self) {
        self.paused = false;
    }
}

/// Handle returned when a task is scheduled; used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskHandle(pub u64);

#[derive(Debug, Clone)]
struct Scheduled<T> {
    handle: TaskHandle,
    due: Tick,
    /// Repeat interval for periodic tasks
    period: Option<u64>,
    task: T,
}

/// Deferred and periodic task queue
///
/// Tasks are plain data; whoever drains the scheduler interprets them. Due tasks
/// come out in registration order.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    entries: Vec<Scheduled<T>>,
    next_handle: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_handle: 1,
        }
    }
}

impl<T: Clone> Scheduler<T> {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, due: Tick, period: Option<u64>, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(Scheduled {
            handle,
            due,
            period,
            task,
        });
        handle
    }

    /// Run `task` once, `delay` ticks after `now`
    pub fn after(&mut self, now: Tick, delay: u64, task: T) -> TaskHandle {
        self.push(now + delay.max(1), None, task)
    }

    /// Run `task` every `period` ticks, first firing one period after `now`
    pub fn every(&mut self, now: Tick, period: u64, task: T) -> TaskHandle {
        let period = period.max(1);
        self.push(now + period, Some(period), task)
    }

    /// Cancel a scheduled task. Returns `true` if it was still pending.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    /// Keep only the tasks for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.entries.retain(|e| keep(&e.task));
    }

    /// Collect every task due at or before `now`.
    ///
    /// One-shot tasks are removed; periodic tasks are rescheduled one period on.
    pub fn drain_due(&mut self, now: Tick) -> Vec<(TaskHandle, T)> {
        let mut due = Vec::new();
        self.entries.retain_mut(|entry| {
            if entry.due > now {
                return true;
            }
            due.push((entry.handle, entry.task.clone()));
            match entry.period {
                Some(period) => {
                    entry.due = now + period;
                    true
                }
                None => false,
            }
        });
        due
    }

    /// Whether a task is still pending
    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Number of pending tasks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
