//! Spatial queries for melee hit detection.
//!
//! Hurtboxes (spheres) and obstacles (axis-aligned boxes) are plain ECS
//! components. Layer membership uses rapier's `CollisionGroups` so the same
//! masks drive the physics world and these queries.
//!
//! `SpatialSnapshot` is rebuilt once per tick before any melee system runs,
//! so every weapon sees the same world state within a tick.

use bevy::math::bounding::{Aabb3d, RayCast3d};
use bevy::prelude::*;
use bevy_rapier3d::prelude::{CollisionGroups, Group};

/// Layer of static geometry that blocks melee line of sight.
pub const OBSTACLE_LAYER: Group = Group::GROUP_1;
/// Layer of colliders that can receive melee damage.
pub const DAMAGEABLE_LAYER: Group = Group::GROUP_2;

/// Damage-receiving sphere.
///
/// `owner` points at the entity carrying `Health` when the hurtbox is a
/// separate body part; `None` means the hurtbox entity itself.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Hurtbox {
    pub radius: f32,
    pub owner: Option<Entity>,
}

impl Default for Hurtbox {
    fn default() -> Self {
        Self {
            radius: 0.5,
            owner: None,
        }
    }
}

impl Hurtbox {
    pub fn new(radius: f32) -> Self {
        Self { radius, owner: None }
    }

    pub fn owned_by(radius: f32, owner: Entity) -> Self {
        Self {
            radius,
            owner: Some(owner),
        }
    }
}

/// Line-of-sight blocker (axis-aligned box centered on the entity's translation).
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Obstacle {
    pub half_extents: Vec3,
}

impl Obstacle {
    pub fn new(half_extents: Vec3) -> Self {
        Self { half_extents }
    }
}

/// Overlap query result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Hurtbox entity
    pub collider: Entity,
    /// Entity whose health receives the damage
    pub owner: Entity,
    pub position: Vec3,
}

/// Physics-world queries the resolver needs.
pub trait SpatialQuery {
    /// Colliders on `layers` whose volume intersects the sphere.
    fn overlap_sphere(&self, center: Vec3, radius: f32, layers: Group) -> Vec<Candidate>;

    /// Whether anything on `layers` blocks the segment `from → to`.
    fn segment_blocked(&self, from: Vec3, to: Vec3, layers: Group) -> bool;
}

#[derive(Debug, Clone)]
struct HurtboxShape {
    collider: Entity,
    owner: Entity,
    center: Vec3,
    radius: f32,
    memberships: Group,
}

#[derive(Debug, Clone)]
struct ObstacleShape {
    bounds: Aabb3d,
    memberships: Group,
}

/// Resource: per-tick copy of hurtbox and obstacle geometry.
#[derive(Resource, Debug, Default, Clone)]
pub struct SpatialSnapshot {
    hurtboxes: Vec<HurtboxShape>,
    obstacles: Vec<ObstacleShape>,
}

impl SpatialSnapshot {
    pub fn clear(&mut self) {
        self.hurtboxes.clear();
        self.obstacles.clear();
    }

    pub fn add_hurtbox(&mut self, collider: Entity, hurtbox: &Hurtbox, center: Vec3, memberships: Group) {
        self.hurtboxes.push(HurtboxShape {
            collider,
            owner: hurtbox.owner.unwrap_or(collider),
            center,
            radius: hurtbox.radius,
            memberships,
        });
    }

    pub fn add_obstacle(&mut self, obstacle: &Obstacle, center: Vec3, memberships: Group) {
        self.obstacles.push(ObstacleShape {
            bounds: Aabb3d::new(center, obstacle.half_extents),
            memberships,
        });
    }

    pub fn hurtbox_count(&self) -> usize {
        self.hurtboxes.len()
    }
}

impl SpatialQuery for SpatialSnapshot {
    fn overlap_sphere(&self, center: Vec3, radius: f32, layers: Group) -> Vec<Candidate> {
        self.hurtboxes
            .iter()
            .filter(|shape| shape.memberships.intersects(layers))
            .filter(|shape| shape.center.distance(center) <= radius + shape.radius)
            .map(|shape| Candidate {
                collider: shape.collider,
                owner: shape.owner,
                position: shape.center,
            })
            .collect()
    }

    fn segment_blocked(&self, from: Vec3, to: Vec3, layers: Group) -> bool {
        let offset = to - from;
        let distance = offset.length();
        let Ok(direction) = Dir3::new(offset) else {
            return false;
        };

        let ray = RayCast3d::new(from, direction, distance);
        self.obstacles
            .iter()
            .filter(|shape| shape.memberships.intersects(layers))
            .any(|shape| {
                ray.aabb_intersection_at(&shape.bounds)
                    .is_some_and(|hit| hit < distance)
            })
    }
}

/// System: rebuild the snapshot from the current transforms.
///
/// Entities without `CollisionGroups` default to their natural layer
/// (hurtboxes: `DAMAGEABLE_LAYER`, obstacles: `OBSTACLE_LAYER`).
pub fn refresh_spatial_snapshot(
    mut snapshot: ResMut<SpatialSnapshot>,
    hurtboxes: Query<(Entity, &Hurtbox, &Transform, Option<&CollisionGroups>)>,
    obstacles: Query<(&Obstacle, &Transform, Option<&CollisionGroups>)>,
) {
    snapshot.clear();

    for (entity, hurtbox, transform, groups) in hurtboxes.iter() {
        let memberships = groups.map_or(DAMAGEABLE_LAYER, |g| g.memberships);
        snapshot.add_hurtbox(entity, hurtbox, transform.translation, memberships);
    }

    for (obstacle, transform, groups) in obstacles.iter() {
        let memberships = groups.map_or(OBSTACLE_LAYER, |g| g.memberships);
        snapshot.add_obstacle(obstacle, transform.translation, memberships);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with_target(target: Vec3) -> (SpatialSnapshot, Entity) {
        let entity = Entity::from_raw(7);
        let mut snapshot = SpatialSnapshot::default();
        snapshot.add_hurtbox(entity, &Hurtbox::new(0.3), target, DAMAGEABLE_LAYER);
        (snapshot, entity)
    }

    #[test]
    fn test_overlap_includes_hurtbox_radius() {
        let (snapshot, entity) = snapshot_with_target(Vec3::new(2.2, 0.0, 0.0));

        let hits = snapshot.overlap_sphere(Vec3::ZERO, 2.0, DAMAGEABLE_LAYER);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].collider, entity);
        assert_eq!(hits[0].owner, entity);

        assert!(snapshot.overlap_sphere(Vec3::ZERO, 1.8, DAMAGEABLE_LAYER).is_empty());
    }

    #[test]
    fn test_overlap_respects_layers() {
        let (snapshot, _) = snapshot_with_target(Vec3::X);
        assert!(snapshot.overlap_sphere(Vec3::ZERO, 2.0, Group::GROUP_5).is_empty());
        assert_eq!(snapshot.overlap_sphere(Vec3::ZERO, 2.0, Group::ALL).len(), 1);
    }

    #[test]
    fn test_owner_is_reported() {
        let owner = Entity::from_raw(1);
        let part = Entity::from_raw(2);
        let mut snapshot = SpatialSnapshot::default();
        snapshot.add_hurtbox(part, &Hurtbox::owned_by(0.2, owner), Vec3::X, DAMAGEABLE_LAYER);

        let hits = snapshot.overlap_sphere(Vec3::ZERO, 2.0, DAMAGEABLE_LAYER);
        assert_eq!(hits[0].collider, part);
        assert_eq!(hits[0].owner, owner);
    }

    #[test]
    fn test_segment_blocked_by_wall() {
        let mut snapshot = SpatialSnapshot::default();
        snapshot.add_obstacle(
            &Obstacle::new(Vec3::new(0.1, 2.0, 2.0)),
            Vec3::new(1.0, 0.0, 0.0),
            OBSTACLE_LAYER,
        );

        assert!(snapshot.segment_blocked(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), OBSTACLE_LAYER));
        // Wall is beyond the segment end
        assert!(!snapshot.segment_blocked(Vec3::ZERO, Vec3::new(0.5, 0.0, 0.0), OBSTACLE_LAYER));
        // Wall on a layer the query ignores
        assert!(!snapshot.segment_blocked(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Group::GROUP_3));
        // Segment passing beside the wall
        assert!(!snapshot.segment_blocked(Vec3::ZERO, Vec3::new(0.0, 0.0, 3.0), OBSTACLE_LAYER));
    }
}
