//! Hit application: damage, knockback, stun and the resulting events.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier3d::prelude::ExternalImpulse;

use crate::combat::{DamageDealt, EntityDied, MeleeAttackProfile, MeleeHit, MeleeTargetHit, Stunned};
use crate::components::Health;

/// Impulse pushing the target away from the attack origin.
pub fn knockback_impulse(direction: Vec3, force: f32) -> Vec3 {
    if force <= 0.0 {
        return Vec3::ZERO;
    }
    direction.normalize_or_zero() * force
}

/// Everything a confirmed melee hit writes to.
#[derive(SystemParam)]
pub struct HitEffects<'w, 's> {
    commands: Commands<'w, 's>,
    healths: Query<'w, 's, &'static mut Health>,
    impulses: Query<'w, 's, &'static mut ExternalImpulse>,
    stuns: Query<'w, 's, &'static mut Stunned>,
    target_hits: EventWriter<'w, MeleeTargetHit>,
    damage_dealt: EventWriter<'w, DamageDealt>,
    deaths: EventWriter<'w, EntityDied>,
}

impl HitEffects<'_, '_> {
    pub fn has_health(&self, entity: Entity) -> bool {
        self.healths.contains(entity)
    }

    /// Apply one hit. Missing optional capabilities (rigidbody) are skipped.
    pub fn apply(&mut self, attacker: Entity, profile: &MeleeAttackProfile, hit: &MeleeHit) {
        let Ok(mut health) = self.healths.get_mut(hit.target) else {
            return;
        };

        let was_alive = health.is_alive();
        let applied = health.take_damage(profile.damage, Some(attacker));
        let remaining = health.current;

        self.damage_dealt.write(DamageDealt {
            attacker,
            target: hit.target,
            damage: profile.damage,
            applied,
            impact_point: hit.position,
        });

        if was_alive && remaining == 0 {
            self.deaths.write(EntityDied {
                entity: hit.target,
                killer: Some(attacker),
            });
            crate::logger::log_info(&format!("💀 {:?} killed by {:?}", hit.target, attacker));
        }

        let impulse = knockback_impulse(hit.direction, profile.knockback);
        if impulse != Vec3::ZERO {
            if let Ok(mut external) = self.impulses.get_mut(hit.target) {
                external.impulse += impulse;
            }
        }

        if profile.stun > 0.0 {
            if let Ok(mut stunned) = self.stuns.get_mut(hit.target) {
                stunned.refresh(profile.stun);
            } else {
                self.commands.entity(hit.target).insert(Stunned::new(profile.stun));
            }
        }

        self.target_hits.write(MeleeTargetHit {
            attacker,
            target: hit.target,
            damage: profile.damage,
            impact_point: hit.position,
        });

        crate::logger::log(&format!(
            "💥 Melee hit: {:?} → {:?} ({} '{}', applied {}, HP {})",
            attacker, hit.target, profile.damage, profile.name, applied, remaining
        ));
    }
}
