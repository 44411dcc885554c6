//! Navigation destination optimizer
//!
//! Sits between whoever picks a destination (behavior, scripts) and the
//! movement backend. When the backend is stuck on a partial path the optimizer
//! substitutes a reachable destination, shared between agents through
//! `PathCache`, and throttles how often the external solver is consulted.
//!
//! The solver itself is external (`PathSolver`); this module never builds paths.

use bevy::prelude::*;
use std::sync::Arc;

pub mod cache;
pub mod optimizer;
pub mod recompute;
pub mod solver;
pub mod systems;


pub use cache::{quantize, CacheEviction, GridKey, PathCache, PathCacheEntry};
pub use optimizer::{
    find_fallback_point, partial_fallback, resolve_substitute, NavOptimizer, NavOptimizerConfig, OptimizeOutcome,
};
pub use recompute::{PathRecompute, RecomputePoll, RecomputeStage};
pub use solver::{NavMeshQuery, NavPath, OpenFieldSolver, PathSolver};
pub use systems::NavDestinationRequest;

use crate::{CombatAiSet, DeterministicRng};

/// Navigation plugin (one per level)
///
/// Adding the plugin creates the level's `PathCache`; it is dropped with the world.
///
/// Order (FixedUpdate, `CombatAiSet::Navigation`):
/// 1. jitter_new_optimizers
/// 2. apply_destination_requests
/// 3. advance_path_recompute
/// 4. advance_cache_eviction
pub struct NavigationPlugin {
    solver: Arc<dyn PathSolver>,
    config: NavOptimizerConfig,
}

impl NavigationPlugin {
    pub fn new(solver: impl PathSolver) -> Self {
        Self {
            solver: Arc::new(solver),
            config: NavOptimizerConfig::default(),
        }
    }

    /// Solver already shared with the host (e.g. the level loader).
    pub fn from_shared(solver: Arc<dyn PathSolver>) -> Self {
        Self {
            solver,
            config: NavOptimizerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: NavOptimizerConfig) -> Self {
        self.config = config;
        self
    }
}

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.insert_resource(PathCache::new(self.config.cache_lifetime, self.config.grid_size))
            .insert_resource(CacheEviction::default())
            .insert_resource(NavMeshQuery(self.solver.clone()))
            .insert_resource(self.config.clone())
            .add_event::<NavDestinationRequest>()
            .register_type::<NavOptimizer>();

        app.add_systems(
            FixedUpdate,
            (
                systems::jitter_new_optimizers,
                systems::apply_destination_requests,
                systems::advance_path_recompute,
                systems::advance_cache_eviction,
            )
                .chain()
                .in_set(CombatAiSet::Navigation),
        );
    }
}
