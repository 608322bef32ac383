//! Reflect: send one of the attacker's spells back at them
//!
//! A single 1..=10 draw decides both whether Reflect fires and which eligible
//! spell it picks. The mirrored run happens on a reflected copy of the event,
//! which refuses new reflect marks, so reflection never chains.

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use super::context::EffectCtx;
use super::event::{CombatEvent, Summary};
use crate::error::EffectError;
use crate::spell::kinds::{SpellKind, WeaponSpell};
use crate::spell::registry::EffectRegistries;

/// Reflect chance per tier, out of 10
pub const REFLECT_CHANCE_PER_TIER: u32 = 3;

/// A spell that was sent back
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reflection {
    pub label: &'static str,
    pub tier: u8,
    /// Extra damage the mirrored spell dealt to the attacker
    pub damage: f32,
}

/// Index of the eligible spell a draw selects, or `None` if Reflect fails
pub fn reflect_roll(draw: u32, tier: u8, eligible: usize) -> Option<usize> {
    if eligible == 0 || REFLECT_CHANCE_PER_TIER * (tier as u32) < draw {
        return None;
    }
    Some(draw as usize % eligible)
}

/// Try to reflect a spell from `event` back at its attacker
pub fn resolve(
    registries: &EffectRegistries,
    ctx: &mut EffectCtx<'_>,
    event: &CombatEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<Option<Reflection>, EffectError> {
    let Some(attacker) = event.attacker else {
        return Ok(None);
    };
    let eligible = event.reflect_eligible();
    if event.reflected || eligible.is_empty() {
        return Ok(None);
    }

    let draw = ctx.rng.gen_range(1..=10);
    let Some(index) = reflect_roll(draw, tier, eligible.len()) else {
        return Ok(None);
    };

    // A corrupted defender can only turn Corruption itself around
    let corruption = WeaponSpell::Corruption.label();
    if ctx.host.is_corrupted(event.defender) && !eligible.iter().any(|c| c.label == corruption) {
        debug!("reflect of {} suppressed by corruption", event.defender);
        return Ok(None);
    }

    let candidate = eligible[index];
    let Some(activation) = registries
        .hit(event.caused_by_projectile)
        .get(candidate.label)
    else {
        return Ok(None);
    };
    let Some(mut mirrored) = event.reflected_copy() else {
        return Ok(None);
    };

    // A spell that stays silent (e.g. on the defender's own cooldown) was not reflected
    let mut mirrored_out = Summary::new();
    let damage = activation(ctx, &mut mirrored, candidate.tier, &mut mirrored_out)?;
    if mirrored_out.is_empty() {
        debug!(
            "{} drew {:?} for Reflect but it did not fire",
            event.defender, candidate.label
        );
        return Ok(None);
    }
    if damage > 0.0 && ctx.host.is_alive(attacker) {
        ctx.host
            .apply_damage(attacker, damage, Some(event.defender))?;
    }
    out.push(format!("Reflected {}", candidate.label.trim_end()));
    debug!(
        "{} reflected {:?} back at {attacker} for {damage}",
        event.defender, candidate.label
    );

    Ok(Some(Reflection {
        label: candidate.label,
        tier: candidate.tier,
        damage,
    }))
}
