//! Bow release and arrow landing

use glam::Quat;
use lorebound_core::{ActorId, Vec3};

use super::context::EffectCtx;
use super::event::Summary;
use super::status::StatusKind;
use crate::error::EffectError;
use crate::spell::kinds::{BowBlockSpell, BowReleaseSpell, SpellKind};
use crate::spell::registry::{BlockActivation, ReleaseActivation};

/// Draw strength Volley needs to fire its extra arrows
pub const FULL_DRAW: f32 = 0.9;

/// Spread between Volley arrows, in degrees
const VOLLEY_SPREAD_DEG: f32 = 10.0;

/// A bow was released
#[derive(Debug, Clone, PartialEq)]
pub struct BowReleaseEvent {
    pub shooter: ActorId,
    /// Lore of the bow at release time; arrows carry this snapshot
    pub lore: Vec<String>,
    pub direction: Vec3,
    /// Draw strength, 0.0 to 1.0
    pub power: f32,
}

/// An arrow landed in a block
#[derive(Debug, Clone, PartialEq)]
pub struct BowBlockEvent {
    pub shooter: Option<ActorId>,
    pub impact: Vec3,
}

pub fn release_activation(spell: BowReleaseSpell) -> ReleaseActivation {
    match spell {
        BowReleaseSpell::Volley => volley,
        BowReleaseSpell::Recoil => recoil,
        BowReleaseSpell::Quickdraw => quickdraw,
    }
}

pub fn block_activation(spell: BowBlockSpell) -> BlockActivation {
    match spell {
        BowBlockSpell::Ender => ender,
        BowBlockSpell::Blast => blast,
        BowBlockSpell::Kindle => kindle,
    }
}

/// Extra arrows fanned out left and right of the aim
fn volley(
    ctx: &mut EffectCtx<'_>,
    event: &mut BowReleaseEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<(), EffectError> {
    if tier == 0 || event.power < FULL_DRAW {
        return Ok(());
    }
    let speed = 3.0 * event.power;
    for i in 0..tier {
        let step = (i / 2 + 1) as f32 * VOLLEY_SPREAD_DEG;
        let angle = if i % 2 == 0 { step } else { -step };
        let direction = Quat::from_rotation_y(angle.to_radians()) * event.direction;
        ctx.host
            .spawn_arrow(event.shooter, &event.lore, direction, speed)?;
    }
    out.push(format!("Volley +{tier}"));
    Ok(())
}

fn recoil(
    ctx: &mut EffectCtx<'_>,
    event: &mut BowReleaseEvent,
    tier: u8,
    _out: &mut Summary,
) -> Result<(), EffectError> {
    if tier == 0 || event.direction == Vec3::ZERO {
        return Ok(());
    }
    ctx.host
        .knockback(event.shooter, -event.direction, 0.4 * tier as f32)?;
    Ok(())
}

fn quickdraw(
    ctx: &mut EffectCtx<'_>,
    event: &mut BowReleaseEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<(), EffectError> {
    let label = BowReleaseSpell::Quickdraw.label();
    if tier == 0 || !ctx.ready(event.shooter, label) {
        return Ok(());
    }
    let duration = ctx.seconds(3);
    ctx.host
        .apply_status(event.shooter, StatusKind::Speed, duration, tier - 1)?;
    ctx.start_cooldown(event.shooter, label, 10);
    out.push("Quickdraw");
    Ok(())
}

/// Teleport the shooter to where the arrow landed
fn ender(
    ctx: &mut EffectCtx<'_>,
    event: &mut BowBlockEvent,
    _tier: u8,
    out: &mut Summary,
) -> Result<(), EffectError> {
    let label = BowBlockSpell::Ender.label();
    let Some(shooter) = event.shooter else {
        return Ok(());
    };
    if !ctx.host.is_alive(shooter) || !ctx.ready(shooter, label) {
        return Ok(());
    }
    ctx.host.teleport(shooter, event.impact + Vec3::Y)?;
    ctx.start_cooldown(shooter, label, 5);
    out.push("Ender");
    Ok(())
}

fn blast(
    ctx: &mut EffectCtx<'_>,
    event: &mut BowBlockEvent,
    tier: u8,
    out: &mut Summary,
) -> Result<(), EffectError> {
    let label = BowBlockSpell::Blast.label();
    if tier == 0 {
        return Ok(());
    }
    if let Some(shooter) = event.shooter {
        if !ctx.ready(shooter, label) {
            return Ok(());
        }
        ctx.start_cooldown(shooter, label, 3);
    }
    ctx.host
        .explode(event.impact, 1.5 * tier as f32, event.shooter)?;
    out.push("Blast");
    Ok(())
}

fn kindle(
    ctx: &mut EffectCtx<'_>,
    event: &mut BowBlockEvent,
    _tier: u8,
    _out: &mut Summary,
) -> Result<(), EffectError> {
    ctx.host.ignite_block(event.impact)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::testing::Fixture;
    use crate::host::ActorDirectory;
    use crate::sandbox::WorldAction;

    fn release(shooter: ActorId, power: f32) -> BowReleaseEvent {
        BowReleaseEvent {
            shooter,
            lore: vec!["Volley II".into(), "Lightning I".into()],
            direction: Vec3::X,
            power,
        }
    }

    #[test]
    fn test_volley_needs_full_draw() {
        let mut fx = Fixture::new(5);
        let s = fx.sandbox.spawn("s", Vec3::ZERO);
        volley(&mut fx.ctx(), &mut release(s, 0.5), 2, &mut Summary::new()).unwrap();
        assert!(fx.sandbox.world_log.is_empty());

        volley(&mut fx.ctx(), &mut release(s, 1.0), 2, &mut Summary::new()).unwrap();
        let arrows: Vec<&WorldAction> = fx
            .sandbox
            .world_log
            .iter()
            .filter(|a| matches!(a, WorldAction::Arrow { .. }))
            .collect();
        assert_eq!(arrows.len(), 2);
        if let WorldAction::Arrow { lore, direction, .. } = arrows[0] {
            assert_eq!(lore.len(), 2);
            assert!((direction.length() - 1.0).abs() < 1e-5);
            assert!(direction.z.abs() > 0.0);
        }
    }

    #[test]
    fn test_recoil_pushes_backwards() {
        let mut fx = Fixture::new(5);
        let s = fx.sandbox.spawn("s", Vec3::ZERO);
        recoil(&mut fx.ctx(), &mut release(s, 1.0), 1, &mut Summary::new()).unwrap();
        assert!(fx.sandbox.actor(s).unwrap().pushed.x < 0.0);
    }

    #[test]
    fn test_ender_teleports_shooter() {
        let mut fx = Fixture::new(5);
        let s = fx.sandbox.spawn("s", Vec3::ZERO);
        let mut event = BowBlockEvent {
            shooter: Some(s),
            impact: Vec3::new(8.0, 0.0, 3.0),
        };
        ender(&mut fx.ctx(), &mut event, 0, &mut Summary::new()).unwrap();
        assert_eq!(fx.sandbox.position(s), Some(Vec3::new(8.0, 1.0, 3.0)));
    }

    #[test]
    fn test_blast_without_shooter() {
        let mut fx = Fixture::new(5);
        let mut event = BowBlockEvent {
            shooter: None,
            impact: Vec3::ONE,
        };
        blast(&mut fx.ctx(), &mut event, 2, &mut Summary::new()).unwrap();
        assert_eq!(
            fx.sandbox.world_log,
            vec![WorldAction::Explosion {
                at: Vec3::ONE,
                power: 3.0
            }]
        );
    }
}
