//! Behavior state machine
//!
//! Patrol / Follow / Attack driven by the detection collaborator.
//! Outputs flow down as events: `NavDestinationRequest` (navigation),
//! `AttackAttempt` (melee) and `AgentAnimationEvent` (host animator).

use bevy::prelude::*;

pub mod builder;
pub mod components;
pub mod events;
pub mod systems;

pub use builder::{AgentBuilder, AgentConfigError};
pub use components::*;
pub use events::*;

use crate::combat::{AttackAttempt, DamageDealt, MeleeAttackStarted};
use crate::navigation::NavDestinationRequest;
use crate::CombatAiSet;

/// Behavior Plugin
///
/// Order (FixedUpdate, `CombatAiSet::Behavior`):
/// 1. handle_detection_events: acquired/lost edges
/// 2. behavior_transitions: Follow ↔ Attack
/// 3. behavior_actions: destination, orientation, attack attempts
/// 4. react_to_damage / announce_attacks: animation triggers
/// 5. update_locomotion_feedback: move speed, audio pitch
pub struct BehaviorPlugin;

impl Plugin for BehaviorPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DetectionEvent>()
            .add_event::<AgentAnimationEvent>()
            // Also registered by the navigation/melee plugins; add_event is idempotent
            .add_event::<NavDestinationRequest>()
            .add_event::<AttackAttempt>()
            .add_event::<DamageDealt>()
            .add_event::<MeleeAttackStarted>()
            .register_type::<BehaviorState>()
            .register_type::<BehaviorConfig>()
            .register_type::<Perception>()
            .register_type::<PatrolRoute>()
            .register_type::<LocomotionFeedback>();

        app.add_systems(
            FixedUpdate,
            (
                systems::handle_detection_events,
                systems::behavior_transitions,
                systems::behavior_actions,
                systems::react_to_damage,
                systems::announce_attacks,
                systems::update_locomotion_feedback,
            )
                .chain()
                .in_set(CombatAiSet::Behavior),
        );
    }
}
