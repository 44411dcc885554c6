//! AI reaction systems (damage, attacks, locomotion feedback).

use bevy::prelude::*;

use crate::ai::{AgentAnimationEvent, AnimationTrigger, BehaviorConfig, BehaviorState, LocomotionFeedback};
use crate::combat::{DamageDealt, MeleeAttackStarted};
use crate::components::NavAgent;

/// System: agent took damage → "damaged" animation trigger.
pub fn react_to_damage(
    mut damage_events: EventReader<DamageDealt>,
    agents: Query<(), With<BehaviorState>>,
    mut animations: EventWriter<AgentAnimationEvent>,
) {
    for damage in damage_events.read() {
        if !agents.contains(damage.target) {
            continue;
        }

        animations.write(AgentAnimationEvent {
            agent: damage.target,
            trigger: AnimationTrigger::Damaged,
        });

        crate::logger::log(&format!(
            "⚠️ AI: {:?} damaged by {:?} ({} HP)",
            damage.target, damage.attacker, damage.applied
        ));
    }
}

/// System: agent's attack started → "attack" animation trigger.
pub fn announce_attacks(
    mut started: EventReader<MeleeAttackStarted>,
    agents: Query<(), With<BehaviorState>>,
    mut animations: EventWriter<AgentAnimationEvent>,
) {
    for event in started.read() {
        if agents.contains(event.attacker) {
            animations.write(AgentAnimationEvent {
                agent: event.attacker,
                trigger: AnimationTrigger::Attack,
            });
        }
    }
}

/// System: animation move speed and movement audio pitch from velocity.
pub fn update_locomotion_feedback(mut agents: Query<(&NavAgent, &BehaviorConfig, &mut LocomotionFeedback)>) {
    for (nav, config, mut feedback) in agents.iter_mut() {
        *feedback = LocomotionFeedback::from_velocity(nav.velocity, nav.max_speed, config.pitch_min, config.pitch_max);
    }
}
