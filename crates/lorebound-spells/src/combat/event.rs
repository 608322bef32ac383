//! The per-hit combat event record

use lorebound_core::ActorId;

use crate::spell::kinds::{ArmorSpell, SpellKind};

/// An attacker-side spell that Reflect may send back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflectCandidate {
    pub label: &'static str,
    pub tier: u8,
}

/// Shared record for one hit, passed through every handler of that hit
#[derive(Debug, Clone, PartialEq)]
pub struct CombatEvent {
    pub attacker: Option<ActorId>,
    pub defender: ActorId,
    /// Raw damage before spell bonuses
    pub damage: f32,
    pub attacker_corrupted: bool,
    pub defender_corrupted: bool,
    pub caused_by_projectile: bool,
    /// Set on the mirrored event Reflect builds
    pub reflected: bool,
    reflect_eligible: Vec<ReflectCandidate>,
    evaded_by: Option<&'static str>,
}

impl CombatEvent {
    pub fn new(
        attacker: Option<ActorId>,
        defender: ActorId,
        damage: f32,
        caused_by_projectile: bool,
    ) -> Self {
        Self {
            attacker,
            defender,
            damage,
            attacker_corrupted: false,
            defender_corrupted: false,
            caused_by_projectile,
            reflected: false,
            reflect_eligible: Vec::new(),
            evaded_by: None,
        }
    }

    /// Record corruption state of both sides
    pub fn with_corruption(mut self, attacker: bool, defender: bool) -> Self {
        self.attacker_corrupted = attacker;
        self.defender_corrupted = defender;
        self
    }

    /// Offer a spell that just fired to the defender's Reflect.
    ///
    /// Refused for Reflect itself and on reflected events. Returns whether the
    /// spell was added.
    pub fn mark_reflectable(&mut self, label: &'static str, tier: u8) -> bool {
        if self.reflected || label == ArmorSpell::Reflect.label() {
            return false;
        }
        if self.reflect_eligible.iter().any(|c| c.label == label) {
            return false;
        }
        self.reflect_eligible.push(ReflectCandidate { label, tier });
        true
    }

    pub fn reflect_eligible(&self) -> &[ReflectCandidate] {
        &self.reflect_eligible
    }

    /// Mark the hit evaded. Only the first call wins.
    pub fn evade(&mut self, by: &'static str) -> bool {
        if self.evaded_by.is_some() {
            return false;
        }
        self.evaded_by = Some(by);
        true
    }

    pub fn is_evaded(&self) -> bool {
        self.evaded_by.is_some()
    }

    /// Label of the spell that evaded the hit
    pub fn evaded_by(&self) -> Option<&'static str> {
        self.evaded_by
    }

    /// The same hit seen from the other side, for re-running a reflected spell
    pub fn reflected_copy(&self) -> Option<CombatEvent> {
        let attacker = self.attacker?;
        Some(CombatEvent {
            attacker: Some(self.defender),
            defender: attacker,
            damage: self.damage,
            attacker_corrupted: self.defender_corrupted,
            defender_corrupted: self.attacker_corrupted,
            caused_by_projectile: self.caused_by_projectile,
            reflected: true,
            reflect_eligible: Vec::new(),
            evaded_by: None,
        })
    }
}

/// Human-readable lines produced while handling one side of an event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    lines: Vec<String>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn extend(&mut self, other: Summary) {
        self.lines.extend(other.lines);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Single-line form shown to players
    pub fn render(&self) -> String {
        self.lines.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spell::kinds::WeaponSpell;

    #[test]
    fn test_first_evade_wins() {
        let mut event = CombatEvent::new(None, ActorId::new(), 4.0, false);
        assert!(!event.is_evaded());
        assert!(event.evade("Evasion "));
        assert!(!event.evade("Other "));
        assert_eq!(event.evaded_by(), Some("Evasion "));
    }

    #[test]
    fn test_reflect_is_never_eligible() {
        let mut event = CombatEvent::new(Some(ActorId::new()), ActorId::new(), 4.0, false);
        assert!(!event.mark_reflectable(ArmorSpell::Reflect.label(), 3));
        assert!(event.mark_reflectable(WeaponSpell::Lightning.label(), 1));
        assert!(!event.mark_reflectable(WeaponSpell::Lightning.label(), 2));
        assert_eq!(event.reflect_eligible().len(), 1);
    }

    #[test]
    fn test_reflected_copy_swaps_sides() {
        let attacker = ActorId::new();
        let defender = ActorId::new();
        let mut event =
            CombatEvent::new(Some(attacker), defender, 6.0, true).with_corruption(true, false);
        event.mark_reflectable(WeaponSpell::Gust.label(), 1);

        let mut mirrored = event.reflected_copy().unwrap();
        assert_eq!(mirrored.attacker, Some(defender));
        assert_eq!(mirrored.defender, attacker);
        assert!(mirrored.reflected);
        assert!(mirrored.defender_corrupted);
        assert!(mirrored.caused_by_projectile);
        assert!(mirrored.reflect_eligible().is_empty());

        // Marks on a reflected event are dropped
        assert!(!mirrored.mark_reflectable(WeaponSpell::Gust.label(), 1));
    }

    #[test]
    fn test_no_copy_without_attacker() {
        let event = CombatEvent::new(None, ActorId::new(), 1.0, false);
        assert!(event.reflected_copy().is_none());
    }

    #[test]
    fn test_summary_render() {
        let mut summary = Summary::new();
        assert!(summary.is_empty());
        summary.push("Lightning");
        summary.push("Venom");
        assert_eq!(summary.render(), "Lightning, Venom");
    }
}
