//! Locomotion feedback for animation and audio wiring.

use bevy::prelude::*;

/// Derived every tick from the movement backend's velocity.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct LocomotionFeedback {
    /// Animator "MoveSpeed" parameter (m/s)
    pub move_speed: f32,
    /// Movement loop pitch
    pub audio_pitch: f32,
}

impl Default for LocomotionFeedback {
    fn default() -> Self {
        Self {
            move_speed: 0.0,
            audio_pitch: 1.0,
        }
    }
}

impl LocomotionFeedback {
    /// pitch = lerp(min, max, speed / max_speed)
    pub fn from_velocity(velocity: Vec3, max_speed: f32, pitch_min: f32, pitch_max: f32) -> Self {
        let move_speed = velocity.length();
        let ratio = if max_speed > 0.0 {
            (move_speed / max_speed).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            move_speed,
            audio_pitch: pitch_min + (pitch_max - pitch_min) * ratio,
        }
    }
}
