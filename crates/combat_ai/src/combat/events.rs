//! Combat events (attack requests in, attack lifecycle and damage out).

use bevy::prelude::*;

/// Request: attacker wants to swing (idempotent while busy or cooling down).
#[derive(Event, Debug, Clone)]
pub struct AttackAttempt {
    pub attacker: Entity,
    pub attack_index: usize,
    /// Skip the "valid target in range" pre-check
    pub forced: bool,
}

impl AttackAttempt {
    pub fn new(attacker: Entity) -> Self {
        Self {
            attacker,
            attack_index: 0,
            forced: false,
        }
    }
}

/// Attack accepted and started.
#[derive(Event, Debug, Clone)]
pub struct MeleeAttackStarted {
    pub attacker: Entity,
    pub attack_index: usize,
    pub attack_name: String,
}

/// A target was damaged by a melee attack.
#[derive(Event, Debug, Clone)]
pub struct MeleeTargetHit {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
    pub impact_point: Vec3,
}

/// Attack returned to Ready (timed weapons only).
#[derive(Event, Debug, Clone)]
pub struct MeleeAttackFinished {
    pub attacker: Entity,
}

/// Animation hit frame: run hit detection once for an animation-driven weapon.
#[derive(Event, Debug, Clone)]
pub struct MeleeDamageTrigger {
    pub attacker: Entity,
}

/// Damage applied to a health capability.
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    /// Requested damage
    pub damage: u32,
    /// Health actually removed (less when the target was nearly dead)
    pub applied: u32,
    pub impact_point: Vec3,
}

/// Health reached zero.
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}
