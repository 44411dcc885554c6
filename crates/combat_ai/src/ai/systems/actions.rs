//! Per-state actions: destination, orientation and attack attempts.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::ai::{BehaviorConfig, BehaviorState, PatrolRoute, Perception};
use crate::combat::{AttackAttempt, Stunned};
use crate::navigation::NavDestinationRequest;

/// Turn the body toward `target` around the vertical axis only.
pub fn orient_towards(transform: &mut Transform, target: Vec3) {
    let mut direction = target - transform.translation;
    direction.y = 0.0;

    if direction.length_squared() > 1e-6 {
        transform.look_to(direction, Vec3::Y);
    }
}

/// Where an attacking agent should go: keep closing in until the target is
/// within the stop distance of the detection source, then hold.
pub fn attack_destination(source_point: Vec3, position: Vec3, target: Vec3, stop_distance: f32) -> Vec3 {
    if source_point.distance(target) >= stop_distance {
        target
    } else {
        position
    }
}

/// System: dispatch actions for the current behavior state.
///
/// Runs after the transition check. Stunned agents keep their state and do nothing.
pub fn behavior_actions(
    mut set: ParamSet<(
        Query<&Transform>,
        Query<
            (
                Entity,
                &BehaviorState,
                &BehaviorConfig,
                &Perception,
                &mut Transform,
                Option<&mut PatrolRoute>,
            ),
            Without<Stunned>,
        >,
    )>,
    mut requests: EventWriter<NavDestinationRequest>,
    mut attacks: EventWriter<AttackAttempt>,
) {
    // Known target positions first (targets may be agents themselves)
    let wanted: Vec<Entity> = set.p1().iter().filter_map(|(.., perception, _, _)| perception.known_target).collect();
    let mut target_positions = HashMap::new();
    {
        let transforms = set.p0();
        for target in wanted {
            if let Ok(transform) = transforms.get(target) {
                target_positions.insert(target, transform.translation);
            }
        }
    }

    for (entity, state, config, perception, mut transform, route) in set.p1().iter_mut() {
        let position = transform.translation;
        let target = perception
            .known_target
            .and_then(|target| target_positions.get(&target).copied());

        match state {
            BehaviorState::Patrol => {
                let Some(mut route) = route else {
                    continue;
                };
                route.update_progress(position);
                if let Some(waypoint) = route.destination() {
                    requests.write(NavDestinationRequest {
                        agent: entity,
                        destination: waypoint,
                    });
                }
            }
            BehaviorState::Follow => {
                // Target gone (despawned): hold this tick
                let destination = target.unwrap_or(position);
                requests.write(NavDestinationRequest {
                    agent: entity,
                    destination,
                });
                if let Some(target) = target {
                    orient_towards(&mut transform, target);
                }
            }
            BehaviorState::Attack => {
                let Some(target) = target else {
                    requests.write(NavDestinationRequest {
                        agent: entity,
                        destination: position,
                    });
                    continue;
                };

                let source = perception.source_point(&transform);
                let destination =
                    attack_destination(source, position, target, config.stop_distance(perception.attack_range));
                requests.write(NavDestinationRequest {
                    agent: entity,
                    destination,
                });

                orient_towards(&mut transform, target);
                attacks.write(AttackAttempt {
                    attacker: entity,
                    attack_index: config.attack_index,
                    forced: config.force_attacks,
                });
            }
        }
    }
}
