//! Determinism tests
//!
//! Same seed, same inputs → identical world. The optimizer's RNG draws
//! (interval jitter, recompute stagger, eviction rolls) all come from
//! `DeterministicRng`.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use combat_ai::navigation::NavPath;
use combat_ai::*;

/// Paths toward x > 8 stop at x = 8.
struct WallSolver;

impl PathSolver for WallSolver {
    fn calculate_path(&self, from: Vec3, to: Vec3) -> NavPath {
        if to.x > 8.0 {
            NavPath::new(vec![from, Vec3::new(7.0, 0.0, to.z), Vec3::new(8.0, 0.0, to.z)], PathStatus::Partial)
        } else {
            NavPath::new(vec![from, to], PathStatus::Complete)
        }
    }

    fn sample_position(&self, point: Vec3, _max_distance: f32) -> Option<Vec3> {
        Some(point)
    }
}

/// Minimal movement backend: step toward the destination, report Partial past the wall.
fn move_agents(mut agents: Query<(&mut Transform, &mut NavAgent)>) {
    for (mut transform, mut nav) in agents.iter_mut() {
        let Some(destination) = nav.destination else {
            continue;
        };

        nav.path_status = if destination.x > 8.0 {
            PathStatus::Partial
        } else {
            PathStatus::Complete
        };

        let to_go = destination - transform.translation;
        let step = to_go.clamp_length_max(nav.max_speed / 60.0);
        nav.velocity = step * 60.0;
        transform.translation += step;
    }
}

fn run_simulation(seed: u64, ticks: usize) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let mut app = create_headless_app(seed);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)))
        .add_plugins(CombatAiPlugin::new(WallSolver))
        .add_systems(
            FixedUpdate,
            move_agents.after(CombatAiSet::Navigation).before(CombatAiSet::Melee),
        );

    for i in 0..6 {
        let z = i as f32 * 3.0;
        AgentBuilder::new(Vec3::new(0.0, 0.0, z))
            .with_perception(Perception::new(2.0))
            .with_nav_agent(NavAgent::new(3.0 + i as f32 * 0.2))
            .with_patrol_route(PatrolRoute::new(vec![Vec3::new(12.0, 0.0, z), Vec3::new(0.0, 0.0, z)]))
            .with_weapon(MeleeWeapon::default())
            .spawn(app.world_mut())
            .expect("valid agent");
    }

    for _ in 0..ticks {
        app.update();
    }

    let world = app.world_mut();
    (
        world_snapshot::<Transform>(world),
        world_snapshot::<NavAgent>(world),
        world_snapshot::<NavOptimizer>(world),
    )
}

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;

    let first = run_simulation(SEED, 600);
    let second = run_simulation(SEED, 600);

    assert_eq!(first, second, "same seed ({}) produced different worlds", SEED);
}

#[test]
fn test_determinism_multiple_runs() {
    let snapshots: Vec<_> = (0..3).map(|_| run_simulation(42, 300)).collect();

    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(snapshots[0], *snapshot, "run {} differs from run 0", i);
    }
}

#[test]
fn test_different_seeds_jitter_differently() {
    let (_, _, optimizers_a) = run_simulation(1, 5);
    let (_, _, optimizers_b) = run_simulation(2, 5);

    assert_ne!(optimizers_a, optimizers_b, "interval jitter ignores the seed");
}
