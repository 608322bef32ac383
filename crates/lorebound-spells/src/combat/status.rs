//! Status effects and status manager
//!
//! Spells hand out short timed statuses (slowness, speed, regeneration, ...).
//! The host owns the real status bookkeeping; `StatusManager` is the in-memory
//! version used by the sandbox host.

use lorebound_core::Tick;
use serde::{Deserialize, Serialize};

/// Types of status effects spells can apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    Slowness,
    Speed,
    Regeneration,
    Resistance,
    NightVision,
    WaterBreathing,
    FireResistance,
    HealthBoost,
    Haste,
}

impl StatusKind {
    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Slowness => "Slowness",
            Self::Speed => "Speed",
            Self::Regeneration => "Regeneration",
            Self::Resistance => "Resistance",
            Self::NightVision => "Night Vision",
            Self::WaterBreathing => "Water Breathing",
            Self::FireResistance => "Fire Resistance",
            Self::HealthBoost => "Health Boost",
            Self::Haste => "Haste",
        }
    }
}

/// An active status effect instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    /// Remaining duration in ticks
    pub remaining: Tick,
    /// Potency, 0 = level I
    pub amplifier: u8,
}

impl StatusEffect {
    pub fn new(kind: StatusKind, duration: Tick, amplifier: u8) -> Self {
        Self {
            kind,
            remaining: duration,
            amplifier,
        }
    }

    /// Whether this effect has expired
    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }
}

/// Manages all active status effects on an actor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusManager {
    pub effects: Vec<StatusEffect>,
}

impl StatusManager {
    /// Create a new empty status manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a status effect.
    ///
    /// A stronger amplifier replaces the existing effect; an equal one keeps the
    /// longer duration; a weaker one is ignored.
    pub fn apply(&mut self, effect: StatusEffect) {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == effect.kind) {
            if effect.amplifier > existing.amplifier {
                *existing = effect;
            } else if effect.amplifier == existing.amplifier && effect.remaining > existing.remaining
            {
                existing.remaining = effect.remaining;
            }
        } else {
            self.effects.push(effect);
        }
    }

    /// Advance all effects by `ticks`, dropping expired ones
    pub fn update(&mut self, ticks: Tick) {
        for effect in &mut self.effects {
            effect.remaining = effect.remaining.saturating_sub(ticks);
        }
        self.effects.retain(|e| !e.is_expired());
    }

    /// Remove a status. Returns `true` if it was active.
    pub fn remove(&mut self, kind: StatusKind) -> bool {
        let before = self.effects.len();
        self.effects.retain(|e| e.kind != kind);
        self.effects.len() != before
    }

    /// Check if a specific status is active
    pub fn has_effect(&self, kind: StatusKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    /// The active instance of a status
    pub fn get(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.kind == kind)
    }

    /// Number of active effects
    pub fn count(&self) -> usize {
        self.effects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_expires() {
        let mut mgr = StatusManager::new();
        mgr.apply(StatusEffect::new(StatusKind::Speed, 40, 0));
        mgr.update(39);
        assert!(mgr.has_effect(StatusKind::Speed));
        mgr.update(1);
        assert_eq!(mgr.count(), 0);
    }

    #[test]
    fn test_refresh_takes_longer_duration() {
        let mut mgr = StatusManager::new();
        mgr.apply(StatusEffect::new(StatusKind::Slowness, 60, 1));
        mgr.update(20);
        mgr.apply(StatusEffect::new(StatusKind::Slowness, 30, 1));
        assert_eq!(mgr.get(StatusKind::Slowness).unwrap().remaining, 40);
        mgr.apply(StatusEffect::new(StatusKind::Slowness, 100, 1));
        assert_eq!(mgr.count(), 1);
        assert_eq!(mgr.get(StatusKind::Slowness).unwrap().remaining, 100);
    }

    #[test]
    fn test_stronger_amplifier_replaces() {
        let mut mgr = StatusManager::new();
        mgr.apply(StatusEffect::new(StatusKind::Speed, 100, 0));
        mgr.apply(StatusEffect::new(StatusKind::Speed, 10, 2));
        let speed = mgr.get(StatusKind::Speed).unwrap();
        assert_eq!(speed.amplifier, 2);
        assert_eq!(speed.remaining, 10);

        mgr.apply(StatusEffect::new(StatusKind::Speed, 500, 1));
        assert_eq!(mgr.get(StatusKind::Speed).unwrap().amplifier, 2);
    }

    #[test]
    fn test_remove() {
        let mut mgr = StatusManager::new();
        mgr.apply(StatusEffect::new(StatusKind::NightVision, 40, 0));
        mgr.apply(StatusEffect::new(StatusKind::Haste, 40, 0));
        assert!(mgr.remove(StatusKind::NightVision));
        assert!(!mgr.remove(StatusKind::NightVision));
        assert_eq!(mgr.count(), 1);
        assert!(mgr.has_effect(StatusKind::Haste));
    }
}
