//! Path-query contract of the external navmesh.
//!
//! The core never solves paths itself; it only asks the backend for a full
//! path or for the nearest walkable point.

use bevy::prelude::*;
use std::sync::Arc;

use crate::components::PathStatus;

/// Result of a full path query: ordered corners + status.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavPath {
    pub corners: Vec<Vec3>,
    pub status: PathStatus,
}

impl NavPath {
    pub fn new(corners: Vec<Vec3>, status: PathStatus) -> Self {
        Self { corners, status }
    }

    pub fn invalid() -> Self {
        Self {
            corners: Vec::new(),
            status: PathStatus::Invalid,
        }
    }
}

/// Navmesh query service.
pub trait PathSolver: Send + Sync + 'static {
    /// Full path from `from` to `to`.
    fn calculate_path(&self, from: Vec3, to: Vec3) -> NavPath;

    /// Snap `point` to the nearest walkable surface within `max_distance`.
    fn sample_position(&self, point: Vec3, max_distance: f32) -> Option<Vec3>;
}

/// Resource: the navmesh the current level uses.
#[derive(Resource, Clone)]
pub struct NavMeshQuery(pub Arc<dyn PathSolver>);

impl NavMeshQuery {
    pub fn new(solver: impl PathSolver) -> Self {
        Self(Arc::new(solver))
    }

    pub fn solver(&self) -> &dyn PathSolver {
        self.0.as_ref()
    }
}

/// Obstacle-free flat ground: every destination is reachable in a straight line.
///
/// Used by the headless runner and as a stand-in when a level has no navmesh baked.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenFieldSolver;

impl PathSolver for OpenFieldSolver {
    fn calculate_path(&self, from: Vec3, to: Vec3) -> NavPath {
        NavPath::new(vec![from, to], PathStatus::Complete)
    }

    fn sample_position(&self, point: Vec3, _max_distance: f32) -> Option<Vec3> {
        Some(point)
    }
}
