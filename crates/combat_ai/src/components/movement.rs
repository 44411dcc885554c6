//! Movement backend state: destination in, path status / velocity out

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Status of the path the movement backend is following (or of a path query result).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum PathStatus {
    /// Path reaches the destination
    #[default]
    Complete,
    /// Path ends at the closest reachable point
    Partial,
    /// No usable path
    Invalid,
}

/// Movement backend handle (navmesh agent).
///
/// The core writes `destination`; the backend owns `path_status` and `velocity`
/// and refreshes them every frame.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct NavAgent {
    /// Current destination (None = no target set yet)
    pub destination: Option<Vec3>,
    /// Status of the active path
    pub path_status: PathStatus,
    /// Current velocity (m/s)
    pub velocity: Vec3,
    /// Configured max speed (m/s)
    pub max_speed: f32,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self::new(3.5)
    }
}

impl NavAgent {
    pub fn new(max_speed: f32) -> Self {
        Self {
            destination: None,
            path_status: PathStatus::Complete,
            velocity: Vec3::ZERO,
            max_speed,
        }
    }

    pub fn set_destination(&mut self, destination: Vec3) {
        self.destination = Some(destination);
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}
