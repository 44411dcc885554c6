//! Behavior FSM (state, config, transition rules).
//!
//! Transitions are pure functions of (previous state, this tick's signals);
//! the systems only feed them and apply side effects.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::perception::Perception;

/// Top-level intent of a hostile agent.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub enum BehaviorState {
    /// Walk the patrol route (initial state after spawn)
    #[default]
    Patrol,
    /// Chase the known target
    Follow,
    /// In range: hold/advance and swing
    Attack,
}

/// Edge-triggered detection signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionSignal {
    Acquired,
    Lost,
}

/// Level-triggered signals sampled every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickSignals {
    pub target_visible: bool,
    pub target_in_attack_range: bool,
}

impl From<&Perception> for TickSignals {
    fn from(perception: &Perception) -> Self {
        Self {
            target_visible: perception.target_visible,
            target_in_attack_range: perception.target_in_attack_range,
        }
    }
}

/// Patrol → Follow on acquire; Follow/Attack → Patrol on lost. Anything else is a no-op.
pub fn on_detection_event(state: BehaviorState, signal: DetectionSignal) -> BehaviorState {
    match (state, signal) {
        (BehaviorState::Patrol, DetectionSignal::Acquired) => BehaviorState::Follow,
        (BehaviorState::Follow | BehaviorState::Attack, DetectionSignal::Lost) => BehaviorState::Patrol,
        (state, _) => state,
    }
}

/// Follow → Attack when visible and in range; Attack → Follow when out of range.
pub fn tick_transition(state: BehaviorState, signals: TickSignals) -> BehaviorState {
    match state {
        BehaviorState::Follow if signals.target_visible && signals.target_in_attack_range => BehaviorState::Attack,
        BehaviorState::Attack if !signals.target_in_attack_range => BehaviorState::Follow,
        state => state,
    }
}

/// Behavior tuning (per agent).
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Fraction of the attack range at which an attacking agent stops advancing
    pub attack_stop_distance_ratio: f32,
    /// Movement audio pitch at standstill
    pub pitch_min: f32,
    /// Movement audio pitch at max speed
    pub pitch_max: f32,
    /// Attack profile index used for attack attempts
    pub attack_index: usize,
    /// Skip the resolver's "target in range" pre-check
    pub force_attacks: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            attack_stop_distance_ratio: 0.5,
            pitch_min: 0.8,
            pitch_max: 1.2,
            attack_index: 0,
            force_attacks: false,
        }
    }
}

impl BehaviorConfig {
    /// Keep advancing while the target is at least this far from the detection source.
    pub fn stop_distance(&self, attack_range: f32) -> f32 {
        self.attack_stop_distance_ratio * attack_range
    }
}
