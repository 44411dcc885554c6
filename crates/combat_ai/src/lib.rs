//! Combat AI core
//!
//! Headless ECS core for hostile agents on Bevy 0.16:
//! - ai: Patrol / Follow / Attack behavior machine
//! - navigation: destination optimizer with a shared per-level path cache
//! - combat: phase-timed melee attack resolver with a per-activation hit ledger
//!
//! The host engine owns rendering, animation, physics and the navmesh.
//! It feeds detection events and hurtbox/obstacle geometry in, and reads
//! destinations, animation triggers and damage events out.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

pub mod ai;
pub mod combat;
pub mod components;
pub mod logger;
pub mod navigation;

pub use ai::{
    AgentBuilder, AgentConfigError, BehaviorConfig, BehaviorPlugin, BehaviorState, DetectionEvent, Perception,
    PatrolRoute,
};
pub use combat::{
    AttackAttempt, AttackPhase, AttackRejected, DamageDealt, EntityDied, Hurtbox, MeleeAttackProfile, MeleePlugin,
    MeleeWeapon, Obstacle,
};
pub use components::*;
pub use logger::init_logger;
pub use navigation::{NavDestinationRequest, NavOptimizer, NavOptimizerConfig, NavigationPlugin, PathSolver};

/// Per-tick system order: behavior decides, navigation moves, melee resolves.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombatAiSet {
    Behavior,
    Navigation,
    Melee,
}

/// Main plugin (behavior + navigation + melee)
pub struct CombatAiPlugin {
    solver: Arc<dyn PathSolver>,
    nav_config: NavOptimizerConfig,
}

impl CombatAiPlugin {
    pub fn new(solver: impl PathSolver) -> Self {
        Self {
            solver: Arc::new(solver),
            nav_config: NavOptimizerConfig::default(),
        }
    }

    pub fn with_nav_config(mut self, config: NavOptimizerConfig) -> Self {
        self.nav_config = config;
        self
    }
}

impl Plugin for CombatAiPlugin {
    fn build(&self, app: &mut App) {
        // Fixed timestep 60Hz
        app.insert_resource(Time::<Fixed>::from_hz(60.0));

        // Keep the seed chosen by create_headless_app
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.configure_sets(
            FixedUpdate,
            (CombatAiSet::Behavior, CombatAiSet::Navigation, CombatAiSet::Melee).chain(),
        )
        .add_plugins((
            BehaviorPlugin,
            NavigationPlugin::from_shared(self.solver.clone()).with_config(self.nav_config.clone()),
            MeleePlugin,
        ));
    }
}

/// Deterministic RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Minimal Bevy App for headless runs
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0));

    app
}

/// Component snapshot for determinism checks (sorted by entity index, Debug-encoded).
pub fn world_snapshot<T>(world: &mut World) -> Vec<u8>
where
    T: Component + std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
