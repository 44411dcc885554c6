//! Patrol route (waypoint loop).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Looping list of waypoints.
#[derive(Component, Debug, Clone, Default, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct PatrolRoute {
    pub waypoints: Vec<Vec3>,
    /// Index of the waypoint currently headed for
    pub current: usize,
    /// Distance at which a waypoint counts as reached
    pub reach_radius: f32,
}

impl PatrolRoute {
    pub fn new(waypoints: Vec<Vec3>) -> Self {
        Self {
            waypoints,
            current: 0,
            reach_radius: 2.0,
        }
    }

    /// Move on to the next waypoint once the current one is reached (wraps around).
    pub fn update_progress(&mut self, position: Vec3) {
        let Some(&waypoint) = self.waypoints.get(self.current) else {
            self.current = 0;
            return;
        };

        if position.distance(waypoint) <= self.reach_radius {
            self.current = (self.current + 1) % self.waypoints.len();
        }
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.waypoints.get(self.current).copied()
    }

    /// Index of the waypoint closest to `position` (start of a route).
    pub fn closest_index(&self, position: Vec3) -> Option<usize> {
        self.waypoints
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| position.distance_squared(**a).total_cmp(&position.distance_squared(**b)))
            .map(|(index, _)| index)
    }
}
