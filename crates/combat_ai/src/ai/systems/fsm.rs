//! Behavior FSM systems (detection events, per-tick transitions).

use bevy::prelude::*;

use crate::ai::{
    on_detection_event, tick_transition, AgentAnimationEvent, AnimationTrigger, BehaviorState, DetectionEvent,
    DetectionSignal, Perception, TickSignals,
};
use crate::navigation::NavDestinationRequest;

/// System: apply edge-triggered detection events.
///
/// Keeps `Perception::known_target` in sync and raises/lowers the alerted flag.
pub fn handle_detection_events(
    mut events: EventReader<DetectionEvent>,
    mut agents: Query<(&mut BehaviorState, &mut Perception)>,
    mut animations: EventWriter<AgentAnimationEvent>,
) {
    for event in events.read() {
        let observer = event.observer();
        let Ok((mut state, mut perception)) = agents.get_mut(observer) else {
            continue;
        };

        let (signal, alerted) = match event {
            DetectionEvent::TargetAcquired { target, .. } => {
                perception.known_target = Some(*target);
                (DetectionSignal::Acquired, true)
            }
            DetectionEvent::TargetLost { .. } => {
                perception.known_target = None;
                (DetectionSignal::Lost, false)
            }
        };

        let new_state = on_detection_event(*state, signal);
        if new_state != *state {
            crate::logger::log(&format!("👁️ AI: {:?} {:?} → {:?} ({:?})", observer, *state, new_state, signal));
            *state = new_state;
        }

        animations.write(AgentAnimationEvent {
            agent: observer,
            trigger: AnimationTrigger::Alerted(alerted),
        });
    }
}

/// System: per-tick Follow ↔ Attack transitions.
///
/// Entering Attack stops the agent where it stands.
pub fn behavior_transitions(
    mut agents: Query<(Entity, &mut BehaviorState, &Perception, &Transform)>,
    mut requests: EventWriter<NavDestinationRequest>,
) {
    for (entity, mut state, perception, transform) in agents.iter_mut() {
        let new_state = tick_transition(*state, TickSignals::from(perception));
        if new_state == *state {
            continue;
        }

        crate::logger::log(&format!("⚔️ AI: {:?} {:?} → {:?}", entity, *state, new_state));

        if new_state == BehaviorState::Attack {
            requests.write(NavDestinationRequest {
                agent: entity,
                destination: transform.translation,
            });
        }

        *state = new_state;
    }
}
