//! Hit dispatch
//!
//! One [`CombatEvent`] is built per hit. The attacker's weapon or bow lore runs
//! first and adds bonus damage, then the defender's armor reacts, then Reflect
//! gets its chance. Damage lands last unless the hit was evaded.

use lorebound_core::ActorId;
use serde::Serialize;
use tracing::{debug, warn};

use super::context::EffectCtx;
use super::equipment::{EquipmentSlot, ARMOR_SLOTS};
use super::event::{CombatEvent, Summary};
use super::reflect::{self, Reflection};
use crate::host::Host;
use crate::spell::codec;
use crate::spell::kinds::{ArmorSpell, SpellKind};
use crate::spell::registry::{EffectRegistries, Registry, SideEffect};

/// Inputs for resolving one hit
#[derive(Debug, Clone, Copy)]
pub struct HitRequest<'l> {
    pub attacker: Option<ActorId>,
    pub defender: ActorId,
    pub damage: f32,
    pub caused_by_projectile: bool,
    /// Weapon lore for melee hits, the bow snapshot for arrows
    pub lore: &'l [String],
}

/// What came of a hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitOutcome {
    pub base_damage: f32,
    pub extra_damage: f32,
    /// Damage dealt to the defender; zero when evaded
    pub applied_damage: f32,
    pub evaded: bool,
    pub reflected: Option<Reflection>,
    pub attacker_summary: Vec<String>,
    pub defender_summary: Vec<String>,
}

/// An armor spell as worn, after de-duplication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmorEntry {
    pub slot: EquipmentSlot,
    pub label: String,
    pub tier: u8,
}

/// First lore line of each worn armor piece; a label seen in an earlier slot wins
pub fn armor_spells(host: &dyn Host, actor: ActorId) -> Vec<ArmorEntry> {
    let mut entries: Vec<ArmorEntry> = Vec::new();
    for slot in ARMOR_SLOTS {
        let Some(line) = host.first_lore(actor, slot) else {
            continue;
        };
        let token = codec::decode(&line);
        if entries.iter().any(|e| e.label == token.base) {
            continue;
        }
        entries.push(ArmorEntry {
            slot,
            label: token.base.to_string(),
            tier: token.tier,
        });
    }
    entries
}

/// Run the attacker's lore against the event. Returns the bonus damage.
pub fn dispatch_attacker(
    registries: &EffectRegistries,
    ctx: &mut EffectCtx<'_>,
    event: &mut CombatEvent,
    lore: &[String],
    out: &mut Summary,
) -> f32 {
    if event.attacker_corrupted {
        debug!("attacker is corrupted, skipping weapon lore");
        return 0.0;
    }

    let lookup = registries.hit(event.caused_by_projectile);
    let mut extra = 0.0;
    for line in lore {
        let token = codec::decode(line);
        let Some(activation) = lookup.get(token.base) else {
            debug!("no hit activation for {:?}", token.base);
            continue;
        };
        match activation(ctx, event, token.tier, out) {
            Ok(damage) => extra += damage,
            Err(e) => warn!("{} failed on hit: {}", token.base.trim_end(), e),
        }
    }
    extra
}

/// Run the defender's armor against the event, then Reflect
pub fn dispatch_defender(
    registries: &EffectRegistries,
    ctx: &mut EffectCtx<'_>,
    event: &mut CombatEvent,
    out: &mut Summary,
) -> Option<Reflection> {
    let entries = armor_spells(&*ctx.host, event.defender);

    let mut reflect_tier = None;
    for entry in &entries {
        if entry.label == ArmorSpell::Reflect.label() {
            reflect_tier = Some(entry.tier);
            continue;
        }
        let Some((_, activation)) = registries.armor.lookup(&entry.label) else {
            continue;
        };
        if let Err(e) = activation(ctx, event, entry.tier, out) {
            warn!(
                "{} failed for {}: {}",
                entry.label.trim_end(),
                event.defender,
                e
            );
        }
    }

    let tier = reflect_tier?;
    match reflect::resolve(registries, ctx, event, tier, out) {
        Ok(reflection) => reflection,
        Err(e) => {
            warn!("Reflect failed for {}: {}", event.defender, e);
            None
        }
    }
}

/// Run every lore line against a side-effect registry (bow release, arrow
/// landing, mining). Misses are skipped; failures are logged per line.
pub fn dispatch_lore<K: SpellKind, E>(
    registry: &Registry<K, SideEffect<E>>,
    ctx: &mut EffectCtx<'_>,
    event: &mut E,
    lore: &[String],
    out: &mut Summary,
) {
    for line in lore {
        let token = codec::decode(line);
        let Some((_, activation)) = registry.lookup(token.base) else {
            debug!("no {} activation for {:?}", K::CATEGORY.name(), token.base);
            continue;
        };
        if let Err(e) = activation(ctx, event, token.tier, out) {
            warn!("{} failed: {}", token.base.trim_end(), e);
        }
    }
}

/// Resolve a hit end to end
pub fn resolve_hit(
    registries: &EffectRegistries,
    ctx: &mut EffectCtx<'_>,
    request: HitRequest<'_>,
) -> HitOutcome {
    let attacker_corrupted = request
        .attacker
        .is_some_and(|a| ctx.host.is_corrupted(a));
    let defender_corrupted = ctx.host.is_corrupted(request.defender);
    let mut event = CombatEvent::new(
        request.attacker,
        request.defender,
        request.damage,
        request.caused_by_projectile,
    )
    .with_corruption(attacker_corrupted, defender_corrupted);

    let mut attacker_out = Summary::new();
    let extra = dispatch_attacker(registries, ctx, &mut event, request.lore, &mut attacker_out);

    let mut defender_out = Summary::new();
    let reflected = dispatch_defender(registries, ctx, &mut event, &mut defender_out);

    if let Some(attacker) = request.attacker {
        if !attacker_out.is_empty() {
            ctx.host.show(attacker, &attacker_out.render());
        }
    }
    if !defender_out.is_empty() {
        ctx.host.show(request.defender, &defender_out.render());
    }

    let mut applied = 0.0;
    if !event.is_evaded() && ctx.host.is_alive(request.defender) {
        let total = request.damage + extra;
        match ctx
            .host
            .apply_damage(request.defender, total, request.attacker)
        {
            Ok(()) => applied = total,
            Err(e) => warn!("Failed to damage {}: {}", request.defender, e),
        }
    }

    HitOutcome {
        base_damage: request.damage,
        extra_damage: extra,
        applied_damage: applied,
        evaded: event.is_evaded(),
        reflected,
        attacker_summary: attacker_out.lines().to_vec(),
        defender_summary: defender_out.lines().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::item::{Item, ItemKind};
    use crate::combat::testing::Fixture;
    use crate::host::ActorDirectory;
    use lorebound_core::Vec3;

    fn armor(name: &str, lore: &str) -> Item {
        Item::new(1, name, ItemKind::Armor).with_lore([lore])
    }

    #[test]
    fn test_armor_first_slot_wins() {
        let mut fx = Fixture::new(1);
        let d = fx.sandbox.spawn("d", Vec3::ZERO);
        fx.sandbox.equip(d, EquipmentSlot::Head, armor("Helm", "Thorns I"));
        fx.sandbox.equip(d, EquipmentSlot::Legs, armor("Legs", "Thorns III"));
        fx.sandbox.equip(d, EquipmentSlot::Feet, armor("Boots", "Reflect II"));

        let entries = armor_spells(&fx.sandbox, d);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].slot, EquipmentSlot::Head);
        assert_eq!(entries[0].tier, 1);
        assert_eq!(entries[1].label, "Reflect ");
    }

    #[test]
    fn test_lightning_hit_end_to_end() {
        let registries = EffectRegistries::build().unwrap();
        let mut fx = Fixture::new(1);
        let a = fx.sandbox.spawn("a", Vec3::ZERO);
        let d = fx.sandbox.spawn("d", Vec3::X);
        let lore = vec!["Lightning I".to_string(), "Nonsense IV".to_string()];

        let outcome = resolve_hit(
            &registries,
            &mut fx.ctx(),
            HitRequest {
                attacker: Some(a),
                defender: d,
                damage: 3.0,
                caused_by_projectile: false,
                lore: &lore,
            },
        );
        assert_eq!(outcome.extra_damage, 10.0);
        assert_eq!(outcome.applied_damage, 13.0);
        assert_eq!(fx.sandbox.health(d).unwrap().current, 7.0);
        assert_eq!(fx.sandbox.messages_for(a), vec!["Lightning"]);
        assert!(fx.sandbox.messages_for(d).is_empty());
    }

    #[test]
    fn test_corrupted_attacker_lore_is_skipped() {
        let registries = EffectRegistries::build().unwrap();
        let mut fx = Fixture::new(1);
        let a = fx.sandbox.spawn("a", Vec3::ZERO);
        let d = fx.sandbox.spawn("d", Vec3::X);
        fx.sandbox.add_tag(a, crate::host::CORRUPTED_TAG).unwrap();
        let lore = vec!["Lightning I".to_string()];

        let outcome = resolve_hit(
            &registries,
            &mut fx.ctx(),
            HitRequest {
                attacker: Some(a),
                defender: d,
                damage: 3.0,
                caused_by_projectile: false,
                lore: &lore,
            },
        );
        assert_eq!(outcome.extra_damage, 0.0);
        assert_eq!(outcome.applied_damage, 3.0);
        assert!(fx.sandbox.messages_for(a).is_empty());
    }

    #[test]
    fn test_thorns_summary_goes_to_defender() {
        let registries = EffectRegistries::build().unwrap();
        let mut fx = Fixture::new(1);
        let a = fx.sandbox.spawn("a", Vec3::ZERO);
        let d = fx.sandbox.spawn("d", Vec3::X);
        fx.sandbox.equip(d, EquipmentSlot::Chest, armor("Plate", "Thorns II"));

        let outcome = resolve_hit(
            &registries,
            &mut fx.ctx(),
            HitRequest {
                attacker: Some(a),
                defender: d,
                damage: 1.0,
                caused_by_projectile: false,
                lore: &[],
            },
        );
        assert_eq!(outcome.defender_summary, vec!["Thorns".to_string()]);
        assert_eq!(fx.sandbox.health(a).unwrap().current, 18.0);
        assert_eq!(fx.sandbox.messages_for(d), vec!["Thorns"]);
    }
}
