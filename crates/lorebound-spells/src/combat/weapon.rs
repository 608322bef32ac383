//! Weapon and bow-hit activations
//!
//! Every activation returns the extra damage it adds to the hit. Spells that
//! affect the defender offer themselves to Reflect via `mark_reflectable`.

use lorebound_core::Vec3;

use super::context::EffectCtx;
use super::event::{CombatEvent, Summary};
use super::status::StatusKind;
use super::task::DeferredTask;
use crate::error::EffectError;
use crate::host::CORRUPTED_TAG;
use crate::spell::kinds::{BowHitSpell, SpellKind, WeaponSpell};
use crate::spell::registry::HitActivation;

/// Flat bonus damage of a Lightning strike
pub const LIGHTNING_DAMAGE: f32 = 10.0;
pub const LIGHTNING_COOLDOWN: u32 = 7;

/// Seconds a Corruption tag stays on its victim
pub const CORRUPTION_DURATION: u32 = 10;
const CORRUPTION_COOLDOWN: u32 = 60;

const CLEAVE_RADIUS: f32 = 3.0;
const EXECUTE_THRESHOLD: f32 = 0.3;

/// Activation for a melee weapon spell
pub fn activation(spell: WeaponSpell) -> HitActivation {
    match spell {
        WeaponSpell::Lightning => lightning,
        WeaponSpell::Inferno => inferno,
        WeaponSpell::Venom => venom,
        WeaponSpell::Frostbite => frostbite,
        WeaponSpell::Lifesteal => lifesteal,
        WeaponSpell::Gust => gust,
        WeaponSpell::Executioner => executioner,
        WeaponSpell::Cleave => cleave,
        WeaponSpell::Corruption => corruption,
    }
}

/// Activation for a spell carried by an arrow
pub fn bow_activation(spell: BowHitSpell) -> HitActivation {
    match spell {
        BowHitSpell::Lightning => lightning,
        BowHitSpell::Sharpshot => sharpshot,
        BowHitSpell::Venom => venom,
        BowHitSpell::Ensnare => ensnare,
    }
}

fn lightning(
    ctx: &mut EffectCtx<'_>,
    event: &mut CombatEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<f32, EffectError> {
    let label = WeaponSpell::Lightning.label();
    let Some(attacker) = event.attacker else {
        return Ok(0.0);
    };
    if tier == 0 || !ctx.ready(attacker, label) {
        return Ok(0.0);
    }

    if let Some(at) = ctx.host.position(event.defender) {
        ctx.host.strike_lightning(at)?;
    }
    ctx.start_cooldown(attacker, label, LIGHTNING_COOLDOWN);
    event.mark_reflectable(label, tier);
    out.push("Lightning");
    Ok(LIGHTNING_DAMAGE)
}

fn inferno(
    ctx: &mut EffectCtx<'_>,
    event: &mut CombatEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<f32, EffectError> {
    let label = WeaponSpell::Inferno.label();
    let Some(attacker) = event.attacker else {
        return Ok(0.0);
    };
    if tier == 0 || !ctx.ready(attacker, label) {
        return Ok(0.0);
    }

    let duration = ctx.seconds(2 * tier as u32);
    ctx.host.set_on_fire(event.defender, duration)?;
    ctx.start_cooldown(attacker, label, 5);
    event.mark_reflectable(label, tier);
    out.push("Inferno");
    Ok(0.0)
}

/// Poison: one damage pulse per second for `2 + tier` seconds
fn venom(
    ctx: &mut EffectCtx<'_>,
    event: &mut CombatEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<f32, EffectError> {
    let label = WeaponSpell::Venom.label();
    let Some(attacker) = event.attacker else {
        return Ok(0.0);
    };
    if tier == 0 || !ctx.ready(attacker, label) {
        return Ok(0.0);
    }

    let pulse = ctx.every_seconds(
        1,
        DeferredTask::DamagePulse {
            target: event.defender,
            source: Some(attacker),
            amount: 1.0,
        },
    );
    ctx.after_seconds(2 + tier as u32, DeferredTask::Cancel(pulse));
    ctx.start_cooldown(attacker, label, 10);
    event.mark_reflectable(label, tier);
    out.push("Venom");
    Ok(0.0)
}

fn frostbite(
    ctx: &mut EffectCtx<'_>,
    event: &mut CombatEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<f32, EffectError> {
    let label = WeaponSpell::Frostbite.label();
    let Some(attacker) = event.attacker else {
        return Ok(0.0);
    };
    if tier == 0 || !ctx.ready(attacker, label) {
        return Ok(0.0);
    }

    let duration = ctx.seconds(2 + tier as u32);
    ctx.host
        .apply_status(event.defender, StatusKind::Slowness, duration, tier - 1)?;
    ctx.start_cooldown(attacker, label, 8);
    event.mark_reflectable(label, tier);
    out.push("Frostbite");
    Ok(0.0)
}

fn lifesteal(
    ctx: &mut EffectCtx<'_>,
    event: &mut CombatEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<f32, EffectError> {
    let Some(attacker) = event.attacker else {
        return Ok(0.0);
    };
    if tier == 0 || !ctx.host.is_alive(attacker) {
        return Ok(0.0);
    }

    let amount = (event.damage * 0.1 * tier as f32).max(0.5);
    ctx.host.heal(attacker, amount)?;
    out.push(format!("Lifesteal +{amount:.1}"));
    Ok(0.0)
}

fn gust(
    ctx: &mut EffectCtx<'_>,
    event: &mut CombatEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<f32, EffectError> {
    let label = WeaponSpell::Gust.label();
    let Some(attacker) = event.attacker else {
        return Ok(0.0);
    };
    if tier == 0 || !ctx.ready(attacker, label) {
        return Ok(0.0);
    }
    let (Some(from), Some(to)) = (ctx.host.position(attacker), ctx.host.position(event.defender))
    else {
        return Ok(0.0);
    };

    // Straight up when both stand on the same spot
    let direction = (to - from).try_normalize().unwrap_or(Vec3::Y);
    ctx.host
        .knockback(event.defender, direction, 0.4 + 0.6 * tier as f32)?;
    ctx.start_cooldown(attacker, label, 3);
    event.mark_reflectable(label, tier);
    out.push("Gust");
    Ok(0.0)
}

fn executioner(
    ctx: &mut EffectCtx<'_>,
    event: &mut CombatEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<f32, EffectError> {
    if tier == 0 {
        return Ok(0.0);
    }
    let Some(health) = ctx.host.health(event.defender) else {
        return Ok(0.0);
    };
    if health.fraction() >= EXECUTE_THRESHOLD {
        return Ok(0.0);
    }

    out.push("Execute");
    Ok(event.damage * 0.25 * tier as f32)
}

fn cleave(
    ctx: &mut EffectCtx<'_>,
    event: &mut CombatEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<f32, EffectError> {
    let label = WeaponSpell::Cleave.label();
    let Some(attacker) = event.attacker else {
        return Ok(0.0);
    };
    if tier == 0 || !ctx.ready(attacker, label) {
        return Ok(0.0);
    }
    let Some(center) = ctx.host.position(event.defender) else {
        return Ok(0.0);
    };

    let mut hit = 0;
    for bystander in ctx.host.actors_near(center, CLEAVE_RADIUS) {
        if bystander == attacker || bystander == event.defender {
            continue;
        }
        ctx.host
            .apply_damage(bystander, 1.5 * tier as f32, Some(attacker))?;
        hit += 1;
    }
    if hit > 0 {
        ctx.start_cooldown(attacker, label, 4);
        out.push(format!("Cleave x{hit}"));
    }
    Ok(0.0)
}

/// Tags the defender as corrupted, silencing its defensive and continuous spells
fn corruption(
    ctx: &mut EffectCtx<'_>,
    event: &mut CombatEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<f32, EffectError> {
    let label = WeaponSpell::Corruption.label();
    let Some(attacker) = event.attacker else {
        return Ok(0.0);
    };
    if !ctx.ready(attacker, label) || ctx.host.is_corrupted(event.defender) {
        return Ok(0.0);
    }

    ctx.host.add_tag(event.defender, CORRUPTED_TAG)?;
    ctx.after_seconds(
        CORRUPTION_DURATION,
        DeferredTask::ClearTag {
            actor: event.defender,
            tag: CORRUPTED_TAG,
        },
    );
    ctx.start_cooldown(attacker, label, CORRUPTION_COOLDOWN);
    event.mark_reflectable(label, tier);
    out.push("Corruption");
    Ok(0.0)
}

fn sharpshot(
    _ctx: &mut EffectCtx<'_>,
    event: &mut CombatEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<f32, EffectError> {
    if tier == 0 || !event.caused_by_projectile {
        return Ok(0.0);
    }
    out.push("Sharpshot");
    Ok(tier as f32)
}

fn ensnare(
    ctx: &mut EffectCtx<'_>,
    event: &mut CombatEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<f32, EffectError> {
    let label = BowHitSpell::Ensnare.label();
    let Some(attacker) = event.attacker else {
        return Ok(0.0);
    };
    if tier == 0 || !ctx.ready(attacker, label) {
        return Ok(0.0);
    }

    let duration = ctx.seconds(1 + tier as u32);
    ctx.host
        .apply_status(event.defender, StatusKind::Slowness, duration, 3)?;
    ctx.start_cooldown(attacker, label, 6);
    event.mark_reflectable(label, tier);
    out.push("Ensnare");
    Ok(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::testing::{Fixture, TPS};
    use crate::host::ActorDirectory;
    use crate::sandbox::WorldAction;
    use lorebound_core::ActorId;

    fn duel(fx: &mut Fixture) -> (ActorId, ActorId) {
        let a = fx.sandbox.spawn("attacker", Vec3::ZERO);
        let d = fx.sandbox.spawn("defender", Vec3::new(1.0, 0.0, 0.0));
        (a, d)
    }

    #[test]
    fn test_lightning_deals_ten_and_cools_down() {
        let mut fx = Fixture::new(1);
        let (a, d) = duel(&mut fx);
        let mut event = CombatEvent::new(Some(a), d, 4.0, false);
        let mut out = Summary::new();

        let run = activation(WeaponSpell::Lightning);
        let extra = run(&mut fx.ctx(), &mut event, 1, &mut out).unwrap();
        assert_eq!(extra, 10.0);
        assert_eq!(
            fx.cooldowns.remaining(a, "Lightning ", fx.now),
            Some(LIGHTNING_COOLDOWN as u64 * TPS)
        );
        assert_eq!(event.reflect_eligible().len(), 1);
        assert!(matches!(fx.sandbox.world_log[0], WorldAction::Lightning { .. }));

        // Second hit while cooling down adds nothing
        let extra = run(&mut fx.ctx(), &mut event, 3, &mut out).unwrap();
        assert_eq!(extra, 0.0);
        assert_eq!(out.render(), "Lightning");
    }

    #[test]
    fn test_lightning_needs_tier() {
        let mut fx = Fixture::new(1);
        let (a, d) = duel(&mut fx);
        let mut event = CombatEvent::new(Some(a), d, 4.0, false);
        let extra = lightning(&mut fx.ctx(), &mut event, 0, &mut Summary::new()).unwrap();
        assert_eq!(extra, 0.0);
        assert!(fx.cooldowns.is_empty());
    }

    #[test]
    fn test_venom_schedules_pulses_and_cancel() {
        let mut fx = Fixture::new(1);
        let (a, d) = duel(&mut fx);
        let mut event = CombatEvent::new(Some(a), d, 4.0, false);
        venom(&mut fx.ctx(), &mut event, 2, &mut Summary::new()).unwrap();

        // Periodic pulse plus the task that cancels it
        assert_eq!(fx.tasks.len(), 2);
        let mut pulses = 0;
        for now in fx.now + 1..=fx.now + 10 * TPS {
            for (_, task) in fx.tasks.drain_due(now) {
                if matches!(task, DeferredTask::DamagePulse { .. }) {
                    pulses += 1;
                }
                task.run(&mut fx.sandbox, &mut fx.tasks).unwrap();
            }
        }
        assert_eq!(pulses, 4);
        assert!(fx.tasks.is_empty());
        assert_eq!(fx.sandbox.health(d).unwrap().current, 16.0);
    }

    #[test]
    fn test_corruption_tags_once() {
        let mut fx = Fixture::new(1);
        let (a, d) = duel(&mut fx);
        let mut event = CombatEvent::new(Some(a), d, 4.0, false);
        let mut out = Summary::new();
        corruption(&mut fx.ctx(), &mut event, 0, &mut out).unwrap();
        assert!(fx.sandbox.is_corrupted(d));
        assert_eq!(fx.tasks.len(), 1);
        assert_eq!(event.reflect_eligible()[0].label, "Corruption");

        // Cooldown blocks a second application by the same attacker
        let mut again = CombatEvent::new(Some(a), d, 4.0, false);
        corruption(&mut fx.ctx(), &mut again, 0, &mut out).unwrap();
        assert_eq!(fx.tasks.len(), 1);
    }

    #[test]
    fn test_executioner_below_threshold() {
        let mut fx = Fixture::new(1);
        let (a, d) = duel(&mut fx);
        let mut event = CombatEvent::new(Some(a), d, 8.0, false);
        let mut out = Summary::new();
        assert_eq!(executioner(&mut fx.ctx(), &mut event, 2, &mut out).unwrap(), 0.0);

        fx.sandbox.apply_damage(d, 16.0, None).unwrap();
        assert_eq!(executioner(&mut fx.ctx(), &mut event, 2, &mut out).unwrap(), 4.0);
    }

    #[test]
    fn test_cleave_hits_bystanders_only() {
        let mut fx = Fixture::new(1);
        let (a, d) = duel(&mut fx);
        let by = fx.sandbox.spawn("bystander", Vec3::new(2.0, 0.0, 0.0));
        let far = fx.sandbox.spawn("far", Vec3::new(20.0, 0.0, 0.0));
        let mut event = CombatEvent::new(Some(a), d, 4.0, false);
        let mut out = Summary::new();
        cleave(&mut fx.ctx(), &mut event, 2, &mut out).unwrap();

        assert_eq!(fx.sandbox.health(by).unwrap().current, 17.0);
        assert_eq!(fx.sandbox.health(far).unwrap().current, 20.0);
        assert_eq!(fx.sandbox.health(d).unwrap().current, 20.0);
        assert_eq!(fx.sandbox.health(a).unwrap().current, 20.0);
        assert_eq!(out.render(), "Cleave x1");
    }

    #[test]
    fn test_sharpshot_only_for_arrows() {
        let mut fx = Fixture::new(1);
        let (a, d) = duel(&mut fx);
        let mut melee = CombatEvent::new(Some(a), d, 4.0, false);
        let mut arrow = CombatEvent::new(Some(a), d, 4.0, true);
        let run = bow_activation(BowHitSpell::Sharpshot);
        assert_eq!(run(&mut fx.ctx(), &mut melee, 3, &mut Summary::new()).unwrap(), 0.0);
        assert_eq!(run(&mut fx.ctx(), &mut arrow, 3, &mut Summary::new()).unwrap(), 3.0);
    }

    #[test]
    fn test_gust_pushes_defender_away() {
        let mut fx = Fixture::new(1);
        let (a, d) = duel(&mut fx);
        let mut event = CombatEvent::new(Some(a), d, 4.0, false);
        gust(&mut fx.ctx(), &mut event, 1, &mut Summary::new()).unwrap();
        assert!(fx.sandbox.actor(d).unwrap().pushed.x > 0.0);
    }
}
