//! Headless combat AI run
//!
//! One patrolling agent, one target dummy. Stand-ins for the host engine:
//! a straight-line mover (movement backend) and a proximity sensor
//! (detection module).

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use combat_ai::{
    create_headless_app, AgentBuilder, BehaviorState, CombatAiPlugin, CombatAiSet, DetectionEvent, Health, Hurtbox,
    MeleeWeapon, NavAgent, PatrolRoute, Perception,
};
use combat_ai::navigation::OpenFieldSolver;

/// Sensor range of the demo detection stand-in (meters)
const SIGHT_RANGE: f32 = 8.0;
/// Mover stops this close to its destination
const ARRIVAL_RADIUS: f32 = 0.8;
const TICK: f64 = 1.0 / 60.0;

#[derive(Component)]
struct Dummy;

/// Detection stand-in: nearest dummy within sight range.
fn proximity_sensor(
    mut agents: Query<(Entity, &Transform, &mut Perception)>,
    dummies: Query<(Entity, &Transform), With<Dummy>>,
    mut detections: EventWriter<DetectionEvent>,
) {
    for (observer, transform, mut perception) in agents.iter_mut() {
        let nearest = dummies
            .iter()
            .map(|(entity, dummy)| (entity, transform.translation.distance(dummy.translation)))
            .filter(|(_, distance)| *distance <= SIGHT_RANGE)
            .min_by(|a, b| a.1.total_cmp(&b.1));

        let in_range = nearest.is_some_and(|(_, distance)| distance <= perception.attack_range);
        perception.target_visible = nearest.is_some();
        perception.target_in_attack_range = in_range;

        match (nearest, perception.known_target) {
            (Some((target, _)), None) => {
                detections.write(DetectionEvent::TargetAcquired { observer, target });
            }
            (None, Some(_)) => {
                detections.write(DetectionEvent::TargetLost { observer });
            }
            _ => {}
        }
    }
}

/// Movement stand-in: straight line toward the destination at max speed.
fn straight_line_mover(mut agents: Query<(&mut Transform, &mut NavAgent)>, time: Res<Time<Fixed>>) {
    let dt = time.delta_secs();

    for (mut transform, mut nav) in agents.iter_mut() {
        let Some(destination) = nav.destination else {
            nav.velocity = Vec3::ZERO;
            continue;
        };

        let to_go = destination - transform.translation;
        if to_go.length() <= ARRIVAL_RADIUS {
            nav.velocity = Vec3::ZERO;
            continue;
        }

        let step = (nav.max_speed * dt).min(to_go.length() - ARRIVAL_RADIUS);
        nav.velocity = to_go.normalize() * nav.max_speed;
        transform.translation += to_go.normalize() * step;
    }
}

fn main() {
    let seed = 42;
    println!("Starting combat AI headless run (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(TICK)))
        .add_plugins(CombatAiPlugin::new(OpenFieldSolver))
        .add_systems(FixedUpdate, proximity_sensor.before(CombatAiSet::Behavior))
        .add_systems(
            FixedUpdate,
            straight_line_mover
                .after(CombatAiSet::Navigation)
                .before(CombatAiSet::Melee),
        );

    let agent = AgentBuilder::new(Vec3::new(-12.0, 0.0, 0.0))
        .with_perception(Perception::new(2.0))
        .with_nav_agent(NavAgent::new(3.5))
        .with_patrol_route(PatrolRoute::new(vec![
            Vec3::new(-12.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
        ]))
        .with_weapon(MeleeWeapon::default())
        .spawn(app.world_mut());

    let agent = match agent {
        Ok(agent) => agent,
        Err(err) => {
            eprintln!("Agent rejected: {}", err);
            return;
        }
    };

    let dummy = app
        .world_mut()
        .spawn((Dummy, Transform::from_xyz(4.0, 0.0, 0.0), Health::new(100), Hurtbox::new(0.5)))
        .id();

    // 20 seconds of simulation
    for tick in 0..1200 {
        app.update();

        if tick % 60 == 0 {
            let world = app.world();
            let state = world.get::<BehaviorState>(agent).copied().unwrap_or_default();
            let position = world.get::<Transform>(agent).map(|t| t.translation).unwrap_or_default();
            let hp = world.get::<Health>(dummy).map_or(0, |h| h.current);
            println!("Tick {}: agent {:?} at {:.1?}, dummy HP {}", tick, state, position, hp);
        }
    }

    println!("Run complete!");
}
