//! Destination optimizer: decides per request whether to pass the raw
//! destination through, reuse a cached correction, or kick off a staggered
//! recomputation.
//!
//! # Flow
//!
//! ```text
//! request(dest) ── changed > threshold && backend Partial? ──no──→ PassThrough
//!        │ yes
//!        ├── fresh cache entry for quantize(dest)? ──yes──→ CacheHit(entry.destination)
//!        ├── not computing && check interval elapsed? ──yes──→ StartRecompute(key)
//!        └── otherwise ──→ Throttled (raw destination this tick)
//! ```

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::cache::{GridKey, PathCache};
use super::solver::{NavPath, PathSolver};
use crate::components::{NavAgent, PathStatus};

/// Optimizer tuning (Resource).
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavOptimizerConfig {
    /// Seconds a cache entry stays trustworthy
    pub cache_lifetime: f32,
    /// Base interval between recomputations per agent (seconds)
    pub path_check_interval: f32,
    /// Per-agent spread of the interval (fraction, ±)
    pub interval_jitter: f32,
    /// Cache cell size (world units)
    pub grid_size: f32,
    /// Minimal destination change that re-arms optimization (world units)
    pub change_threshold: f32,
    /// Recompute start delay is drawn from min_start_delay_ticks..=max_start_delay_ticks
    pub min_start_delay_ticks: u32,
    pub max_start_delay_ticks: u32,
    /// Fractions of the agent→destination line probed when the path is invalid
    pub probe_fractions: Vec<f32>,
    /// Surface snap radius for probe points
    pub probe_radius: f32,
    /// Chance that a cache write starts an eviction scan
    pub eviction_chance: f64,
    /// Keys inspected per tick by the eviction scan
    pub eviction_batch: usize,
}

impl Default for NavOptimizerConfig {
    fn default() -> Self {
        Self {
            cache_lifetime: 3.0,
            path_check_interval: 0.3,
            interval_jitter: 0.1,
            grid_size: 2.0,
            change_threshold: 2.0,
            min_start_delay_ticks: 0,
            max_start_delay_ticks: 2,
            probe_fractions: vec![0.25, 0.5, 0.75],
            probe_radius: 3.0,
            eviction_chance: 0.01,
            eviction_batch: 10,
        }
    }
}

impl NavOptimizerConfig {
    /// Per-agent check interval: base ± jitter, clamped at zero.
    pub fn jittered_interval(&self, rng: &mut impl Rng) -> f32 {
        let spread = self.interval_jitter.abs();
        let factor = if spread > 0.0 {
            1.0 + rng.gen_range(-spread..=spread)
        } else {
            1.0
        };
        (self.path_check_interval * factor).max(0.0)
    }

    /// Ticks to wait before a recompute queries the solver. A minimum above
    /// the maximum collapses to the maximum.
    pub fn start_delay(&self, rng: &mut impl Rng) -> u32 {
        let min = self.min_start_delay_ticks.min(self.max_start_delay_ticks);
        rng.gen_range(min..=self.max_start_delay_ticks)
    }
}

/// Outcome of one optimization attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptimizeOutcome {
    /// Trigger not met, use the raw destination
    PassThrough,
    /// Fresh cached correction to use instead
    CacheHit(Vec3),
    /// Recomputation scheduled for this cache key; raw destination meanwhile
    StartRecompute(GridKey),
    /// Trigger met but this agent is busy or checked too recently
    Throttled,
}

/// Per-agent optimizer state.
///
/// `is_computing` guards against two overlapping recomputations of the same
/// agent; other agents are never blocked by it. Recomputes read the agent
/// position, so a `Transform` is always present.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct NavOptimizer {
    /// Last destination the optimizer handled (cache hit or finished recompute)
    pub last_destination: Option<Vec3>,
    /// Time of the last recompute start
    pub last_path_check: Option<f32>,
    pub is_computing: bool,
    /// Seconds between recomputations (jittered once at spawn)
    pub path_check_interval: f32,
    /// Jitter already applied
    pub jittered: bool,
}

impl Default for NavOptimizer {
    fn default() -> Self {
        Self::new(NavOptimizerConfig::default().path_check_interval)
    }
}

impl NavOptimizer {
    pub fn new(path_check_interval: f32) -> Self {
        Self {
            last_destination: None,
            last_path_check: None,
            is_computing: false,
            path_check_interval,
            jittered: false,
        }
    }

    /// Optimize only if the destination moved noticeably and the backend is on a partial path.
    pub fn should_optimize(&self, requested: Vec3, status: PathStatus, threshold: f32) -> bool {
        let changed = self
            .last_destination
            .map_or(true, |last| last.distance(requested) > threshold);

        changed && status == PathStatus::Partial
    }

    pub fn try_optimize(
        &mut self,
        requested: Vec3,
        agent: &NavAgent,
        cache: &PathCache,
        config: &NavOptimizerConfig,
        now: f32,
    ) -> OptimizeOutcome {
        if !self.should_optimize(requested, agent.path_status, config.change_threshold) {
            return OptimizeOutcome::PassThrough;
        }

        let key = cache.key_for(requested);
        if let Some(entry) = cache.fresh(key, now) {
            self.last_destination = Some(requested);
            return OptimizeOutcome::CacheHit(entry.destination);
        }

        let interval_elapsed = self
            .last_path_check
            .map_or(true, |last| now - last > self.path_check_interval);

        if !self.is_computing && interval_elapsed {
            self.is_computing = true;
            self.last_path_check = Some(now);
            return OptimizeOutcome::StartRecompute(key);
        }

        OptimizeOutcome::Throttled
    }

    /// Recompute finished: remember what was handled and release the agent.
    pub fn finish(&mut self, original: Vec3) {
        self.last_destination = Some(original);
        self.is_computing = false;
    }
}

/// Partial path: second-to-last corner (steadier than the last one when the
/// partial end oscillates), or the only corner.
pub fn partial_fallback(corners: &[Vec3]) -> Option<Vec3> {
    match corners.len() {
        0 => None,
        1 => Some(corners[0]),
        n => Some(corners[n - 2]),
    }
}

/// Invalid path: walk the straight line agent→destination and snap the first
/// probe that lands on the navmesh. Stay in place if none does.
pub fn find_fallback_point(
    agent_position: Vec3,
    original: Vec3,
    solver: &dyn PathSolver,
    probe_fractions: &[f32],
    probe_radius: f32,
) -> Vec3 {
    let offset = original - agent_position;
    let direction = offset.normalize_or_zero();
    let distance = offset.length();

    probe_fractions
        .iter()
        .map(|fraction| agent_position + direction * distance * fraction)
        .find_map(|probe| solver.sample_position(probe, probe_radius))
        .unwrap_or(agent_position)
}

/// Substitute destination for a finished path query.
pub fn resolve_substitute(
    original: Vec3,
    path: &NavPath,
    agent_position: Vec3,
    solver: &dyn PathSolver,
    config: &NavOptimizerConfig,
) -> Vec3 {
    match path.status {
        PathStatus::Complete => original,
        PathStatus::Partial => partial_fallback(&path.corners).unwrap_or(original),
        PathStatus::Invalid => find_fallback_point(
            agent_position,
            original,
            solver,
            &config.probe_fractions,
            config.probe_radius,
        ),
    }
}
