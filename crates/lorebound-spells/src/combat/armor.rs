//! Armor activations that react to an incoming hit
//!
//! Reflect is resolved separately after these run, and the continuous armor
//! spells are driven by machines, so neither has an activation here.

use super::context::EffectCtx;
use super::event::{CombatEvent, Summary};
use super::status::StatusKind;
use crate::error::EffectError;
use crate::spell::kinds::{ArmorSpell, SpellKind};
use crate::spell::registry::ArmorActivation;

/// Percent chance per tier that Evasion dodges a hit
pub const EVASION_CHANCE_PER_TIER: u32 = 5;

/// Hit activation for an armor spell, if it has one
pub fn activation(spell: ArmorSpell) -> Option<ArmorActivation> {
    match spell {
        ArmorSpell::Evasion => Some(evasion as ArmorActivation),
        ArmorSpell::Thorns => Some(thorns as ArmorActivation),
        ArmorSpell::Fortify => Some(fortify as ArmorActivation),
        ArmorSpell::Rejuvenation => Some(rejuvenation as ArmorActivation),
        ArmorSpell::Reflect
        | ArmorSpell::FrostAura
        | ArmorSpell::Momentum
        | ArmorSpell::NightSight
        | ArmorSpell::Gills
        | ArmorSpell::FireWard
        | ArmorSpell::Vitality => None,
    }
}

fn evasion(
    ctx: &mut EffectCtx<'_>,
    event: &mut CombatEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<(), EffectError> {
    let label = ArmorSpell::Evasion.label();
    if tier == 0 || event.defender_corrupted || !ctx.ready(event.defender, label) {
        return Ok(());
    }
    if !ctx.chance(EVASION_CHANCE_PER_TIER * tier as u32) {
        return Ok(());
    }
    if event.evade(label) {
        ctx.start_cooldown(event.defender, label, 5);
        out.push("Evaded");
    }
    Ok(())
}

fn thorns(
    ctx: &mut EffectCtx<'_>,
    event: &mut CombatEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<(), EffectError> {
    let Some(attacker) = event.attacker else {
        return Ok(());
    };
    // Arrows do not prick the shooter
    if tier == 0 || event.defender_corrupted || event.caused_by_projectile {
        return Ok(());
    }
    if !ctx.host.is_alive(attacker) {
        return Ok(());
    }
    ctx.host
        .apply_damage(attacker, tier as f32, Some(event.defender))?;
    out.push("Thorns");
    Ok(())
}

/// Resistance when health runs low
fn fortify(
    ctx: &mut EffectCtx<'_>,
    event: &mut CombatEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<(), EffectError> {
    let label = ArmorSpell::Fortify.label();
    if tier == 0 || event.defender_corrupted || !ctx.ready(event.defender, label) {
        return Ok(());
    }
    let Some(health) = ctx.host.health(event.defender) else {
        return Ok(());
    };
    if health.fraction() >= 0.4 {
        return Ok(());
    }

    let duration = ctx.seconds(5);
    ctx.host
        .apply_status(event.defender, StatusKind::Resistance, duration, tier - 1)?;
    ctx.start_cooldown(event.defender, label, 30);
    out.push("Fortify");
    Ok(())
}

fn rejuvenation(
    ctx: &mut EffectCtx<'_>,
    event: &mut CombatEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<(), EffectError> {
    let label = ArmorSpell::Rejuvenation.label();
    if tier == 0 || event.defender_corrupted || !ctx.ready(event.defender, label) {
        return Ok(());
    }
    let duration = ctx.seconds(4);
    ctx.host
        .apply_status(event.defender, StatusKind::Regeneration, duration, tier - 1)?;
    ctx.start_cooldown(event.defender, label, 20);
    out.push("Rejuvenation");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::testing::Fixture;
    use crate::host::ActorDirectory;
    use lorebound_core::Vec3;

    #[test]
    fn test_only_reactive_spells_have_activations() {
        let wired: Vec<ArmorSpell> = ArmorSpell::all()
            .iter()
            .copied()
            .filter(|k| activation(*k).is_some())
            .collect();
        assert_eq!(
            wired,
            vec![
                ArmorSpell::Evasion,
                ArmorSpell::Thorns,
                ArmorSpell::Fortify,
                ArmorSpell::Rejuvenation
            ]
        );
    }

    #[test]
    fn test_evasion_eventually_evades_once() {
        let mut fx = Fixture::new(3);
        let a = fx.sandbox.spawn("a", Vec3::ZERO);
        let d = fx.sandbox.spawn("d", Vec3::ZERO);
        let mut evaded = 0;
        for _ in 0..500 {
            let mut event = CombatEvent::new(Some(a), d, 2.0, false);
            evasion(&mut fx.ctx(), &mut event, 3, &mut Summary::new()).unwrap();
            if event.is_evaded() {
                evaded += 1;
            }
        }
        // The cooldown never expires here, so at most one dodge
        assert_eq!(evaded, 1);
    }

    #[test]
    fn test_corrupted_defender_cannot_evade() {
        let mut fx = Fixture::new(3);
        let a = fx.sandbox.spawn("a", Vec3::ZERO);
        let d = fx.sandbox.spawn("d", Vec3::ZERO);
        for _ in 0..500 {
            let mut event = CombatEvent::new(Some(a), d, 2.0, false).with_corruption(false, true);
            evasion(&mut fx.ctx(), &mut event, 3, &mut Summary::new()).unwrap();
            assert!(!event.is_evaded());
        }
    }

    #[test]
    fn test_thorns_hurts_melee_attacker() {
        let mut fx = Fixture::new(3);
        let a = fx.sandbox.spawn("a", Vec3::ZERO);
        let d = fx.sandbox.spawn("d", Vec3::ZERO);
        let mut melee = CombatEvent::new(Some(a), d, 2.0, false);
        thorns(&mut fx.ctx(), &mut melee, 2, &mut Summary::new()).unwrap();
        let mut arrow = CombatEvent::new(Some(a), d, 2.0, true);
        thorns(&mut fx.ctx(), &mut arrow, 2, &mut Summary::new()).unwrap();
        assert_eq!(fx.sandbox.health(a).unwrap().current, 18.0);
    }

    #[test]
    fn test_fortify_below_forty_percent() {
        let mut fx = Fixture::new(3);
        let d = fx.sandbox.spawn("d", Vec3::ZERO);
        let mut event = CombatEvent::new(None, d, 2.0, false);
        fortify(&mut fx.ctx(), &mut event, 2, &mut Summary::new()).unwrap();
        assert!(!fx.sandbox.has_status(d, StatusKind::Resistance));

        fx.sandbox.apply_damage(d, 15.0, None).unwrap();
        fortify(&mut fx.ctx(), &mut event, 2, &mut Summary::new()).unwrap();
        assert!(fx.sandbox.has_status(d, StatusKind::Resistance));
    }
}
