//! Tests for melee weapon components.

use bevy::prelude::*;

use super::melee::*;
use super::profile::MeleeAttackProfile;
use crate::combat::spatial::{Hurtbox, Obstacle, SpatialSnapshot, DAMAGEABLE_LAYER, OBSTACLE_LAYER};

const TICK: f32 = 1.0 / 60.0;

fn test_profile() -> MeleeAttackProfile {
    MeleeAttackProfile {
        name: "Swipe".to_string(),
        damage: 10,
        range: 2.0,
        cone_angle_degrees: 90.0,
        ..default()
    }
}

/// Point at `distance` from the origin, `degrees` off the -Z forward axis (in the XZ plane).
fn off_axis(distance: f32, degrees: f32) -> Vec3 {
    let radians = degrees.to_radians();
    Vec3::new(radians.sin(), 0.0, -radians.cos()) * distance
}

#[test]
fn test_empty_profiles_get_default() {
    let weapon = MeleeWeapon::new("Empty", Vec::new());
    assert_eq!(weapon.profiles().len(), 1);
    assert_eq!(weapon.profiles()[0], MeleeAttackProfile::default());
}

#[test]
fn test_default_profile_values() {
    let profile = MeleeAttackProfile::default();
    assert_eq!(profile.damage, 30);
    assert_eq!(profile.range, 2.0);
    assert_eq!(profile.cone_angle_degrees, 45.0);
    assert_eq!(profile.cooldown, 1.0);
    assert!((profile.total_duration() - 1.0).abs() < 1e-6);
}

#[test]
fn test_can_attack_respects_cooldown() {
    let mut weapon = MeleeWeapon::new("Claws", vec![test_profile()]).with_trigger(AttackTrigger::AnimationDriven);
    assert!(weapon.can_attack(0.0));

    weapon.force_start_attack(0, 10.0).expect("ready weapon starts");

    // Every tick inside the 1 s cooldown window is refused
    for step in 0..60 {
        let now = 10.0 + step as f32 * TICK;
        assert!(!weapon.can_attack(now), "t = {}", now);
    }
    assert!(weapon.can_attack(11.0));
}

#[test]
fn test_rejections_are_typed() {
    let mut weapon = MeleeWeapon::new("Claws", vec![test_profile()]);

    assert_eq!(weapon.try_start_attack(0, 0.0, |_| false), Err(AttackRejected::NoTargets));
    assert_eq!(
        weapon.force_start_attack(3, 0.0),
        Err(AttackRejected::UnknownProfile { index: 3, count: 1 })
    );

    weapon.try_start_attack(0, 0.0, |_| true).expect("target present");
    assert_eq!(weapon.force_start_attack(0, 0.1), Err(AttackRejected::Busy(AttackPhase::Windup)));
    assert_eq!(weapon.remaining_cooldown(0.1), f32::INFINITY);
}

#[test]
fn test_cooling_down_reports_remaining() {
    let mut weapon = MeleeWeapon::new("Claws", vec![test_profile()]).with_trigger(AttackTrigger::AnimationDriven);

    weapon.force_start_attack(0, 1.0).expect("ready");
    // Animation-driven: stays Ready, only the cooldown gates
    assert_eq!(weapon.phase(), AttackPhase::Ready);

    match weapon.force_start_attack(0, 1.25) {
        Err(AttackRejected::CoolingDown { remaining }) => assert!((remaining - 0.75).abs() < 1e-5),
        other => panic!("expected cooldown rejection, got {:?}", other),
    }
}

#[test]
fn test_phase_sequence_and_total_duration() {
    let mut weapon = MeleeWeapon::new("Claws", vec![test_profile()]);
    weapon.force_start_attack(0, 0.0).expect("ready");

    let mut now = 0.0;
    let mut changes = Vec::new();
    while weapon.phase() != AttackPhase::Ready {
        now += TICK;
        if let Some(change) = weapon.advance(now) {
            changes.push((change.from, change.to, now));
        }
    }

    let phases: Vec<_> = changes.iter().map(|(from, to, _)| (*from, *to)).collect();
    assert_eq!(
        phases,
        vec![
            (AttackPhase::Windup, AttackPhase::Active),
            (AttackPhase::Active, AttackPhase::Recovery),
            (AttackPhase::Recovery, AttackPhase::Ready),
        ]
    );

    let total = test_profile().total_duration();
    assert!((now - total).abs() <= TICK + 1e-4, "finished at {} (expected ~{})", now, total);
}

#[test]
fn test_advance_never_skips_a_phase() {
    let mut weapon = MeleeWeapon::new("Claws", vec![test_profile()]);
    weapon.force_start_attack(0, 0.0).expect("ready");

    // One huge step: still one transition per call
    let change = weapon.advance(5.0).expect("windup over");
    assert_eq!(change.to, AttackPhase::Active);
    assert_eq!(weapon.advance(5.0).map(|c| c.to), Some(AttackPhase::Recovery));
    assert_eq!(weapon.advance(5.0).map(|c| c.to), Some(AttackPhase::Ready));
    assert_eq!(weapon.advance(5.0), None);
}

#[test]
fn test_windup_progress() {
    let mut weapon = MeleeWeapon::new("Claws", vec![test_profile()]);
    weapon.force_start_attack(0, 2.0).expect("ready");
    assert!((weapon.windup_progress(2.15) - 0.5).abs() < 1e-4);
    weapon.advance(2.4);
    assert_eq!(weapon.windup_progress(2.4), 1.0);
}

#[test]
fn test_cone_check() {
    let forward = Vec3::NEG_Z;
    assert!(in_attack_cone(Vec3::ZERO, forward, off_axis(1.0, 30.0), 45.0));
    assert!(in_attack_cone(Vec3::ZERO, forward, off_axis(1.0, -44.0), 45.0));
    assert!(!in_attack_cone(Vec3::ZERO, forward, off_axis(1.0, 60.0), 45.0));
    assert!(!in_attack_cone(Vec3::ZERO, forward, Vec3::Z, 45.0));
    // Coincident target
    assert!(in_attack_cone(Vec3::ZERO, forward, Vec3::ZERO, 45.0));
}

#[test]
fn test_cone_ignores_height_difference() {
    // Default attack point sits 1 m above the body; hurtboxes sit at the feet
    let origin = Vec3::new(0.0, 1.0, -0.5);
    let forward = Vec3::NEG_Z;

    assert!(in_attack_cone(origin, forward, Vec3::new(0.3, 0.0, -1.0), 45.0));
    assert!(!in_attack_cone(origin, forward, Vec3::new(1.0, 0.0, -0.6), 45.0));
    // Straight below the attack point
    assert!(in_attack_cone(origin, forward, Vec3::new(0.0, 0.0, -0.5), 45.0));
}

#[test]
fn test_default_attack_point_hits_ground_level_target() {
    let attacker = Entity::from_raw(1);
    let target = Entity::from_raw(2);

    let mut snapshot = SpatialSnapshot::default();
    snapshot.add_hurtbox(target, &Hurtbox::default(), off_axis(1.5, 20.0), DAMAGEABLE_LAYER);

    let mut weapon = MeleeWeapon::new("Claws", vec![test_profile()]);
    weapon.force_start_attack(0, 0.0).expect("ready");

    // Body at the origin facing -Z, default attack point in body space
    let origin = Transform::default().transform_point(weapon.attack_point);
    let hits = weapon.resolve_hits(attacker, origin, Vec3::NEG_Z, &snapshot, |_| true);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].target, target);
}

#[test]
fn test_resolve_hits_once_per_activation() {
    let attacker = Entity::from_raw(1);
    let target = Entity::from_raw(2);

    let mut snapshot = SpatialSnapshot::default();
    snapshot.add_hurtbox(target, &Hurtbox::new(0.3), off_axis(1.0, 30.0), DAMAGEABLE_LAYER);

    let mut weapon = MeleeWeapon::new("Claws", vec![test_profile()]);
    weapon.force_start_attack(0, 0.0).expect("ready");

    let first = weapon.resolve_hits(attacker, Vec3::ZERO, Vec3::NEG_Z, &snapshot, |_| true);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].target, target);

    // Further Active ticks find the same target again → ledger rejects
    for _ in 0..10 {
        assert!(weapon.resolve_hits(attacker, Vec3::ZERO, Vec3::NEG_Z, &snapshot, |_| true).is_empty());
    }
    assert_eq!(weapon.ledger().len(), 1);
}

#[test]
fn test_resolve_hits_filters() {
    let attacker = Entity::from_raw(1);
    let behind = Entity::from_raw(2);
    let walled = Entity::from_raw(3);
    let no_health = Entity::from_raw(4);
    let ok = Entity::from_raw(5);

    let mut snapshot = SpatialSnapshot::default();
    // The attacker's own hurtbox
    snapshot.add_hurtbox(attacker, &Hurtbox::new(0.5), Vec3::ZERO, DAMAGEABLE_LAYER);
    snapshot.add_hurtbox(behind, &Hurtbox::new(0.3), Vec3::new(0.0, 0.0, 1.0), DAMAGEABLE_LAYER);
    snapshot.add_hurtbox(walled, &Hurtbox::new(0.3), Vec3::new(0.8, 0.0, -1.0), DAMAGEABLE_LAYER);
    snapshot.add_hurtbox(no_health, &Hurtbox::new(0.3), Vec3::new(0.0, 0.0, -1.5), DAMAGEABLE_LAYER);
    snapshot.add_hurtbox(ok, &Hurtbox::new(0.3), Vec3::new(-0.5, 0.0, -1.0), DAMAGEABLE_LAYER);
    // Thin wall between origin and `walled`
    snapshot.add_obstacle(
        &Obstacle::new(Vec3::new(0.05, 1.0, 0.3)),
        Vec3::new(0.5, 0.0, -0.5),
        OBSTACLE_LAYER,
    );

    let mut weapon = MeleeWeapon::new("Claws", vec![test_profile()]);
    weapon.force_start_attack(0, 0.0).expect("ready");

    let hits = weapon.resolve_hits(attacker, Vec3::ZERO, Vec3::NEG_Z, &snapshot, |e| e != no_health);
    let targets: Vec<_> = hits.iter().map(|h| h.target).collect();
    assert_eq!(targets, vec![ok]);
}

#[test]
fn test_hurtboxes_of_one_body_hit_once() {
    let attacker = Entity::from_raw(1);
    let body = Entity::from_raw(2);

    let mut snapshot = SpatialSnapshot::default();
    snapshot.add_hurtbox(Entity::from_raw(3), &Hurtbox::owned_by(0.2, body), Vec3::new(0.0, 0.0, -1.0), DAMAGEABLE_LAYER);
    snapshot.add_hurtbox(Entity::from_raw(4), &Hurtbox::owned_by(0.2, body), Vec3::new(0.0, 0.5, -1.0), DAMAGEABLE_LAYER);

    let mut weapon = MeleeWeapon::new("Claws", vec![test_profile()]);
    weapon.force_start_attack(0, 0.0).expect("ready");

    let hits = weapon.resolve_hits(attacker, Vec3::ZERO, Vec3::NEG_Z, &snapshot, |_| true);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].target, body);
}

#[test]
fn test_new_attack_clears_ledger() {
    let attacker = Entity::from_raw(1);
    let target = Entity::from_raw(2);

    let mut snapshot = SpatialSnapshot::default();
    snapshot.add_hurtbox(target, &Hurtbox::new(0.3), Vec3::new(0.0, 0.0, -1.0), DAMAGEABLE_LAYER);

    let mut weapon = MeleeWeapon::new("Claws", vec![test_profile()]).with_trigger(AttackTrigger::AnimationDriven);
    weapon.force_start_attack(0, 0.0).expect("ready");
    assert_eq!(weapon.resolve_hits(attacker, Vec3::ZERO, Vec3::NEG_Z, &snapshot, |_| true).len(), 1);

    weapon.force_start_attack(0, 2.0).expect("cooldown over");
    assert!(weapon.ledger().is_empty());
    assert_eq!(weapon.resolve_hits(attacker, Vec3::ZERO, Vec3::NEG_Z, &snapshot, |_| true).len(), 1);
}

#[test]
fn test_stun_refresh_keeps_longer() {
    let mut stun = Stunned::new(0.5);
    stun.refresh(0.2);
    assert_eq!(stun.remaining, 0.5);
    stun.refresh(1.0);
    assert_eq!(stun.remaining, 1.0);
    assert!(stun.is_stunned());
}
