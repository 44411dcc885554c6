//! Melee combat systems.
//!
//! Per tick: attack requests → phase advancement → hit detection. Phase
//! advancement always runs before hit detection, so a check never sees a
//! phase the weapon already left.

use bevy::prelude::*;

use super::damage::HitEffects;
use crate::combat::spatial::{SpatialQuery, SpatialSnapshot};
use crate::combat::{
    is_valid_target, AttackAttempt, AttackPhase, AttackRejected, AttackTrigger, MeleeAttackFinished,
    MeleeAttackStarted, MeleeDamageTrigger, MeleeWeapon, WindupTelegraph,
};
use crate::components::Health;

/// World-space attack origin and forward direction for a weapon on `transform`.
pub fn attack_frame(transform: &Transform, weapon: &MeleeWeapon) -> (Vec3, Vec3) {
    let origin = transform.transform_point(weapon.attack_point);
    let forward = transform.forward().as_vec3();
    (origin, forward)
}

/// System: process attack attempts.
///
/// Busy/cooling-down attempts are silent no-ops (behavior retries every tick).
pub fn start_melee_attacks(
    mut commands: Commands,
    mut attempts: EventReader<AttackAttempt>,
    mut weapons: Query<(&Transform, &mut MeleeWeapon)>,
    healths: Query<&Health>,
    snapshot: Res<SpatialSnapshot>,
    mut started: EventWriter<MeleeAttackStarted>,
    time: Res<Time<Fixed>>,
) {
    let now = time.elapsed_secs();

    for attempt in attempts.read() {
        let Ok((transform, mut weapon)) = weapons.get_mut(attempt.attacker) else {
            continue;
        };

        let (origin, _) = attack_frame(transform, &weapon);
        let layers = weapon.damageable_layers;
        let attacker = attempt.attacker;

        let result = if attempt.forced {
            weapon.force_start_attack(attempt.attack_index, now)
        } else {
            weapon.try_start_attack(attempt.attack_index, now, |profile| {
                snapshot
                    .overlap_sphere(origin, profile.range, layers)
                    .iter()
                    .any(|candidate| is_valid_target(attacker, candidate, |e| healths.contains(e)))
            })
        };

        match result {
            Ok(()) => {
                let profile = weapon.current_profile();
                started.write(MeleeAttackStarted {
                    attacker,
                    attack_index: attempt.attack_index,
                    attack_name: profile.name.clone(),
                });

                if weapon.phase() == AttackPhase::Windup {
                    commands.entity(attacker).insert(WindupTelegraph::default());
                }

                crate::logger::log(&format!(
                    "⚔️ Melee attack started: {:?} '{}' (windup {:.2}s, {:?})",
                    attacker, profile.name, profile.windup_time, weapon.trigger
                ));
            }
            Err(AttackRejected::Busy(_)) | Err(AttackRejected::CoolingDown { .. }) => {}
            Err(reason @ AttackRejected::UnknownProfile { .. }) => {
                crate::logger::log_warning(&format!("⚠️ Melee attack rejected for {:?}: {}", attacker, reason));
            }
            Err(reason) => {
                crate::logger::log(&format!("❌ Melee attack rejected for {:?}: {}", attacker, reason));
            }
        }
    }
}

/// System: advance attack phases (windup → active → recovery → ready).
pub fn update_melee_attack_phases(
    mut commands: Commands,
    mut weapons: Query<(Entity, &mut MeleeWeapon, Option<&mut WindupTelegraph>)>,
    mut finished: EventWriter<MeleeAttackFinished>,
    time: Res<Time<Fixed>>,
) {
    let now = time.elapsed_secs();

    for (entity, mut weapon, telegraph) in weapons.iter_mut() {
        let Some(change) = weapon.advance(now) else {
            if let Some(mut telegraph) = telegraph {
                telegraph.progress = weapon.windup_progress(now);
            }
            continue;
        };

        match change.to {
            AttackPhase::Active => {
                commands.entity(entity).remove::<WindupTelegraph>();
                crate::logger::log(&format!("💥 Melee: {:?} Windup → Active", entity));
            }
            AttackPhase::Recovery => {
                crate::logger::log(&format!(
                    "🛡️ Melee: {:?} Active → Recovery ({} hit)",
                    entity,
                    weapon.ledger().len()
                ));
            }
            AttackPhase::Ready => {
                finished.write(MeleeAttackFinished { attacker: entity });
                crate::logger::log(&format!(
                    "✅ Melee: {:?} attack finished (next in {:.2}s)",
                    entity,
                    weapon.remaining_cooldown(now)
                ));
            }
            AttackPhase::Windup => {}
        }
    }
}

/// System: hit detection for Active timed weapons and animation damage triggers.
pub fn resolve_melee_hits(
    mut weapons: Query<(Entity, &Transform, &mut MeleeWeapon)>,
    mut triggers: EventReader<MeleeDamageTrigger>,
    snapshot: Res<SpatialSnapshot>,
    mut effects: HitEffects,
) {
    for (attacker, transform, mut weapon) in weapons.iter_mut() {
        if weapon.trigger != AttackTrigger::Timed || !weapon.is_active() {
            continue;
        }
        strike(attacker, transform, &mut weapon, &snapshot, &mut effects);
    }

    for trigger in triggers.read() {
        let Ok((attacker, transform, mut weapon)) = weapons.get_mut(trigger.attacker) else {
            continue;
        };

        if weapon.trigger != AttackTrigger::AnimationDriven {
            crate::logger::log_warning(&format!(
                "⚠️ Melee: damage trigger for {:?} ignored (weapon '{}' is timed)",
                attacker, weapon.name
            ));
            continue;
        }

        strike(attacker, transform, &mut weapon, &snapshot, &mut effects);
    }
}

fn strike(
    attacker: Entity,
    transform: &Transform,
    weapon: &mut MeleeWeapon,
    snapshot: &SpatialSnapshot,
    effects: &mut HitEffects,
) {
    let (origin, forward) = attack_frame(transform, weapon);
    let hits = weapon.resolve_hits(attacker, origin, forward, snapshot, |e| effects.has_health(e));
    if hits.is_empty() {
        return;
    }

    let profile = weapon.current_profile().clone();
    for hit in &hits {
        effects.apply(attacker, &profile, hit);
    }
}
