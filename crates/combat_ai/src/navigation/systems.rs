//! Navigation systems (FixedUpdate, chained in this order).
//!
//! 1. `jitter_new_optimizers`: spread per-agent check intervals at spawn
//! 2. `apply_destination_requests`: optimizer decision for every request this tick
//! 3. `advance_path_recompute`: drive staggered recompute tasks
//! 4. `advance_cache_eviction`: one batch of the stale-entry scan

use bevy::prelude::*;
use rand::Rng;

use super::cache::{CacheEviction, PathCache, PathCacheEntry};
use super::optimizer::{resolve_substitute, NavOptimizer, NavOptimizerConfig, OptimizeOutcome};
use super::recompute::{PathRecompute, RecomputePoll};
use super::solver::NavMeshQuery;
use crate::components::NavAgent;
use crate::DeterministicRng;

/// Request: move `agent` to `destination` (from behavior or any other driver).
#[derive(Event, Debug, Clone)]
pub struct NavDestinationRequest {
    pub agent: Entity,
    pub destination: Vec3,
}

/// System: apply spawn-time interval jitter so agents don't recompute in lockstep.
pub fn jitter_new_optimizers(
    mut optimizers: Query<&mut NavOptimizer, Added<NavOptimizer>>,
    config: Res<NavOptimizerConfig>,
    mut rng: ResMut<DeterministicRng>,
) {
    for mut optimizer in optimizers.iter_mut() {
        if optimizer.jittered {
            continue;
        }
        optimizer.path_check_interval = config.jittered_interval(&mut rng.rng);
        optimizer.jittered = true;
    }
}

/// System: route destination requests through the optimizer.
///
/// Agents without `NavOptimizer` always get the raw destination.
pub fn apply_destination_requests(
    mut commands: Commands,
    mut requests: EventReader<NavDestinationRequest>,
    mut agents: Query<(&mut NavAgent, Option<&mut NavOptimizer>)>,
    cache: Res<PathCache>,
    config: Res<NavOptimizerConfig>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let now = time.elapsed_secs();

    for request in requests.read() {
        let Ok((mut agent, optimizer)) = agents.get_mut(request.agent) else {
            continue;
        };

        let Some(mut optimizer) = optimizer else {
            agent.set_destination(request.destination);
            continue;
        };

        match optimizer.try_optimize(request.destination, &agent, &cache, &config, now) {
            OptimizeOutcome::CacheHit(destination) => {
                crate::logger::log(&format!(
                    "🗺️ Nav: {:?} cache hit {:?} → {:?}",
                    request.agent, request.destination, destination
                ));
                agent.set_destination(destination);
            }
            OptimizeOutcome::StartRecompute(key) => {
                let delay = config.start_delay(&mut rng.rng);
                commands
                    .entity(request.agent)
                    .insert(PathRecompute::new(request.destination, key, delay));
                crate::logger::log(&format!(
                    "🧭 Nav: {:?} recompute scheduled for {:?} (delay {} ticks)",
                    request.agent, request.destination, delay
                ));
                agent.set_destination(request.destination);
            }
            OptimizeOutcome::PassThrough | OptimizeOutcome::Throttled => {
                agent.set_destination(request.destination);
            }
        }
    }
}

/// System: advance recompute tasks (delay → query → settle).
pub fn advance_path_recompute(
    mut commands: Commands,
    mut tasks: Query<(Entity, &Transform, &mut NavAgent, &mut NavOptimizer, &mut PathRecompute)>,
    navmesh: Res<NavMeshQuery>,
    mut cache: ResMut<PathCache>,
    mut eviction: ResMut<CacheEviction>,
    config: Res<NavOptimizerConfig>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let now = time.elapsed_secs();
    let solver = navmesh.solver();

    for (entity, transform, mut agent, mut optimizer, mut task) in tasks.iter_mut() {
        match task.poll() {
            RecomputePoll::Pending => {}
            RecomputePoll::QueryDue => {
                let path = solver.calculate_path(transform.translation, task.original);
                task.settle(path);
            }
            RecomputePoll::Ready(path) => {
                let substitute =
                    resolve_substitute(task.original, &path, transform.translation, solver, &config);

                cache.insert(
                    task.key,
                    PathCacheEntry {
                        destination: substitute,
                        timestamp: now,
                        status: path.status,
                    },
                );

                if rng.rng.gen_bool(config.eviction_chance.clamp(0.0, 1.0)) && eviction.start(&cache) {
                    crate::logger::log(&format!("🧹 Nav: cache eviction scan started ({} entries)", cache.len()));
                }

                agent.set_destination(substitute);
                optimizer.finish(task.original);
                commands.entity(entity).remove::<PathRecompute>();

                crate::logger::log(&format!(
                    "🧭 Nav: {:?} recompute done ({:?}): {:?} → {:?}",
                    entity, path.status, task.original, substitute
                ));
            }
        }
    }
}

/// System: advance the eviction scan by one batch.
pub fn advance_cache_eviction(
    mut eviction: ResMut<CacheEviction>,
    mut cache: ResMut<PathCache>,
    config: Res<NavOptimizerConfig>,
    time: Res<Time<Fixed>>,
) {
    if !eviction.is_running() {
        return;
    }

    if let Some(removed) = eviction.step(&mut cache, time.elapsed_secs(), config.eviction_batch) {
        crate::logger::log(&format!(
            "🧹 Nav: cache eviction finished, removed {} stale entries ({} left)",
            removed,
            cache.len()
        ));
    }
}
