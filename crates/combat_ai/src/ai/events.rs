//! AI events: detection input, animation triggers output.

use bevy::prelude::*;

/// Edge-triggered detection notifications from the perception collaborator.
///
/// Fired once on the transition, never every tick while the target stays visible.
#[derive(Event, Debug, Clone)]
pub enum DetectionEvent {
    /// Observer acquired a target
    TargetAcquired {
        /// Entity that perceives
        observer: Entity,
        /// Entity that was detected
        target: Entity,
    },

    /// Observer lost its target (out of sight for long enough, or despawned)
    TargetLost { observer: Entity },
}

impl DetectionEvent {
    pub fn observer(&self) -> Entity {
        match self {
            DetectionEvent::TargetAcquired { observer, .. } | DetectionEvent::TargetLost { observer } => *observer,
        }
    }
}

/// Animation triggers for the host's animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationTrigger {
    /// "Alerted" flag (true on acquire, false on lost)
    Alerted(bool),
    /// Attack swing started
    Attack,
    /// Took damage
    Damaged,
}

#[derive(Event, Debug, Clone)]
pub struct AgentAnimationEvent {
    pub agent: Entity,
    pub trigger: AnimationTrigger,
}
