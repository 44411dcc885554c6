//! Detection collaborator output.

use bevy::prelude::*;

/// What the detection source currently reports for this agent.
///
/// Written by the host's detection module (vision cone, hearing, ...); the
/// core only reads it, except for `known_target`, which also follows
/// `DetectionEvent`s.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Perception {
    pub target_visible: bool,
    pub target_in_attack_range: bool,
    pub known_target: Option<Entity>,
    /// Attack range configured on the detection module
    pub attack_range: f32,
    /// Detection source point in the agent's local space (eyes/muzzle)
    pub detection_source_offset: Vec3,
}

impl Default for Perception {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl Perception {
    pub fn new(attack_range: f32) -> Self {
        Self {
            target_visible: false,
            target_in_attack_range: false,
            known_target: None,
            attack_range,
            detection_source_offset: Vec3::new(0.0, 1.0, 0.0),
        }
    }

    /// World position of the detection source point.
    pub fn source_point(&self, transform: &Transform) -> Vec3 {
        transform.transform_point(self.detection_source_offset)
    }
}
