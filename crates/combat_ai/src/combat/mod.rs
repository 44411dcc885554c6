//! Melee attack resolver
//!
//! Handled here:
//! - Timing: phase state machine per weapon (windup → active → recovery)
//! - Geometry: range / cone / line-of-sight filtering against hurtboxes
//! - Rules: one damage application per target per activation
//! - Events: MeleeAttackStarted, MeleeTargetHit, MeleeAttackFinished, DamageDealt
//!
//! Left to the host: animation, VFX/SFX, physics response to the
//! knockback impulse.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod spatial;
pub mod systems;

pub use components::*;
pub use events::*;
pub use spatial::{Hurtbox, Obstacle, SpatialQuery, SpatialSnapshot, DAMAGEABLE_LAYER, OBSTACLE_LAYER};

use crate::CombatAiSet;

/// Melee Plugin
///
/// System order (FixedUpdate, `CombatAiSet::Melee`):
/// 1. refresh_spatial_snapshot: hurtbox/obstacle geometry for this tick
/// 2. start_melee_attacks: AttackAttempt → Windup
/// 3. update_melee_attack_phases: phase timers
/// 4. resolve_melee_hits: Active weapons + animation damage triggers
/// 5. tick_stuns: stun timers
pub struct MeleePlugin;

impl Plugin for MeleePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpatialSnapshot>()
            .add_event::<AttackAttempt>()
            .add_event::<MeleeAttackStarted>()
            .add_event::<MeleeTargetHit>()
            .add_event::<MeleeAttackFinished>()
            .add_event::<MeleeDamageTrigger>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>()
            .register_type::<Hurtbox>()
            .register_type::<Obstacle>()
            .register_type::<WindupTelegraph>()
            .register_type::<Stunned>();

        app.add_systems(
            FixedUpdate,
            (
                spatial::refresh_spatial_snapshot,
                systems::start_melee_attacks,
                systems::update_melee_attack_phases,
                systems::resolve_melee_hits,
                systems::tick_stuns,
            )
                .chain() // Sequential for determinism
                .in_set(CombatAiSet::Melee),
        );
    }
}
