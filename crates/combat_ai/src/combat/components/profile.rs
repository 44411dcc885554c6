//! Melee attack profile (immutable per-attack tuning).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// One attack of a melee weapon, selected by index at attack start.
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct MeleeAttackProfile {
    pub name: String,
    pub damage: u32,
    /// Reach from the attack point (meters)
    pub range: f32,
    /// Full cone angle; half of it on each side of forward
    pub cone_angle_degrees: f32,
    pub windup_time: f32,
    pub active_time: f32,
    pub recovery_time: f32,
    /// Seconds between attack starts
    pub cooldown: f32,
    /// Impulse magnitude applied along origin → target
    pub knockback: f32,
    /// Stun applied to the target on hit (seconds, 0 = none)
    pub stun: f32,
}

impl Default for MeleeAttackProfile {
    fn default() -> Self {
        Self {
            name: "Basic Attack".to_string(),
            damage: 30,
            range: 2.0,
            cone_angle_degrees: 45.0,
            windup_time: 0.3,
            active_time: 0.2,
            recovery_time: 0.5,
            cooldown: 1.0,
            knockback: 5.0,
            stun: 0.5,
        }
    }
}

impl MeleeAttackProfile {
    /// Windup + Active + Recovery
    pub fn total_duration(&self) -> f32 {
        self.windup_time + self.active_time + self.recovery_time
    }

    /// Elapsed time (since attack start) at which the Active phase ends.
    pub fn active_end(&self) -> f32 {
        self.windup_time + self.active_time
    }

    pub fn half_cone_degrees(&self) -> f32 {
        self.cone_angle_degrees * 0.5
    }
}
