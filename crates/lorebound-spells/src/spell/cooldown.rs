//! Per-actor spell cooldowns
//!
//! A cooldown is a flag keyed by (actor, label) that clears itself once its
//! expiry tick passes. Expiries sit in a min-heap swept once per tick; a flag
//! that is restarted leaves its older heap entry behind as stale.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use lorebound_core::{ActorId, Tick};
use tracing::debug;

type Key = (ActorId, &'static str);

/// Timed flags per (actor, spell label)
#[derive(Debug, Clone)]
pub struct CooldownManager {
    ticks_per_second: u64,
    expiries: HashMap<Key, Tick>,
    queue: BinaryHeap<Reverse<(Tick, ActorId, &'static str)>>,
}

impl CooldownManager {
    pub fn new(ticks_per_second: u64) -> Self {
        Self {
            ticks_per_second,
            expiries: HashMap::new(),
            queue: BinaryHeap::new(),
        }
    }

    /// Mark the flag and schedule its expiry `seconds` from `now`
    pub fn start(&mut self, actor: ActorId, label: &'static str, seconds: u32, now: Tick) {
        let expiry = now + seconds as u64 * self.ticks_per_second;
        self.expiries.insert((actor, label), expiry);
        self.queue.push(Reverse((expiry, actor, label)));
        self.compact_if_stale();
    }

    /// Whether the spell is off cooldown for this actor
    pub fn is_finished(&self, actor: ActorId, label: &'static str) -> bool {
        !self.expiries.contains_key(&(actor, label))
    }

    /// Ticks left before the flag can clear, if it is set
    pub fn remaining(&self, actor: ActorId, label: &'static str, now: Tick) -> Option<u64> {
        self.expiries
            .get(&(actor, label))
            .map(|&expiry| expiry.saturating_sub(now))
    }

    /// Clear every flag whose expiry has passed.
    ///
    /// Flags of actors that fail `is_valid` stay set; actor removal clears them.
    /// Returns the number of flags cleared.
    pub fn sweep(&mut self, now: Tick, is_valid: impl Fn(ActorId) -> bool) -> usize {
        let mut cleared = 0;
        while let Some(Reverse((expiry, actor, label))) = self.queue.peek().copied() {
            if expiry > now {
                break;
            }
            self.queue.pop();

            // Restarted flags leave stale entries behind
            if self.expiries.get(&(actor, label)) != Some(&expiry) {
                continue;
            }
            if !is_valid(actor) {
                debug!("cooldown {label:?} of {actor} expired while actor is invalid");
                continue;
            }
            self.expiries.remove(&(actor, label));
            cleared += 1;
        }
        cleared
    }

    /// Drop every flag belonging to `actor`. Returns how many were set.
    pub fn remove_actor(&mut self, actor: ActorId) -> usize {
        let before = self.expiries.len();
        self.expiries.retain(|(a, _), _| *a != actor);
        self.queue.retain(|Reverse((_, a, _))| *a != actor);
        before - self.expiries.len()
    }

    /// Number of flags held for `actor`
    pub fn count_for(&self, actor: ActorId) -> usize {
        self.expiries.keys().filter(|(a, _)| *a == actor).count()
    }

    /// Number of flags currently set
    pub fn len(&self) -> usize {
        self.expiries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expiries.is_empty()
    }

    /// Heap entries, including stale ones
    pub fn pending_expiries(&self) -> usize {
        self.queue.len()
    }

    fn compact_if_stale(&mut self) {
        if self.queue.len() <= 2 * self.expiries.len() + 64 {
            return;
        }
        self.queue = self
            .expiries
            .iter()
            .map(|(&(actor, label), &expiry)| Reverse((expiry, actor, label)))
            .collect();
    }
}
