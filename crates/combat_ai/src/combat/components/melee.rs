//! Melee weapon components.
//!
//! State tracking for melee attacks (ready → windup → active → recovery),
//! the per-activation hit ledger and the hit reactions (telegraph, stun).

use bevy::prelude::*;
use bevy_rapier3d::prelude::Group;
use thiserror::Error;

use super::profile::MeleeAttackProfile;
use crate::combat::spatial::{Candidate, SpatialQuery, DAMAGEABLE_LAYER, OBSTACLE_LAYER};

// ============================================================================
// Attack Phase
// ============================================================================

/// Melee attack phases.
///
/// Strict order: Ready → Windup → Active → Recovery → Ready.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum AttackPhase {
    /// Not attacking (cooldown may still be running)
    #[default]
    Ready,
    /// Telegraph, no damage
    Windup,
    /// Hit detection every tick
    Active,
    /// No hit checks, cannot attack
    Recovery,
}

impl AttackPhase {
    pub fn next(self) -> Self {
        match self {
            AttackPhase::Ready => AttackPhase::Windup,
            AttackPhase::Windup => AttackPhase::Active,
            AttackPhase::Active => AttackPhase::Recovery,
            AttackPhase::Recovery => AttackPhase::Ready,
        }
    }
}

/// How damage is timed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum AttackTrigger {
    /// Phase timers drive windup/active/recovery
    #[default]
    Timed,
    /// Animation owns the timing; damage arrives as `MeleeDamageTrigger`
    AnimationDriven,
}

// ============================================================================
// Hit Ledger
// ============================================================================

/// Targets damaged during the current activation (cleared on attack start).
///
/// Keyed by the entity that owns the health, so a body with several
/// hurtboxes is hit once.
#[derive(Clone, Debug, Default)]
pub struct HitLedger {
    hit: Vec<Entity>,
}

impl HitLedger {
    pub fn contains(&self, target: Entity) -> bool {
        self.hit.contains(&target)
    }

    /// Returns false if the target was already recorded.
    pub fn record(&mut self, target: Entity) -> bool {
        if self.contains(target) {
            return false;
        }
        self.hit.push(target);
        true
    }

    pub fn clear(&mut self) {
        self.hit.clear();
    }

    pub fn len(&self) -> usize {
        self.hit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hit.is_empty()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Why an attack start was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttackRejected {
    #[error("weapon busy ({0:?})")]
    Busy(AttackPhase),
    #[error("cooling down ({remaining:.2}s left)")]
    CoolingDown { remaining: f32 },
    #[error("unknown attack index {index} (weapon has {count})")]
    UnknownProfile { index: usize, count: usize },
    #[error("no valid target in range")]
    NoTargets,
}

// ============================================================================
// Melee Weapon
// ============================================================================

/// Phase transition reported by `MeleeWeapon::advance`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseChange {
    pub from: AttackPhase,
    pub to: AttackPhase,
}

/// One confirmed hit, already recorded in the ledger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeleeHit {
    pub target: Entity,
    pub collider: Entity,
    pub position: Vec3,
    /// Unit vector origin → target (zero if they coincide)
    pub direction: Vec3,
}

/// Melee weapon mounted on an agent (the component lives on the attacker).
#[derive(Component, Clone, Debug)]
pub struct MeleeWeapon {
    pub name: String,
    profiles: Vec<MeleeAttackProfile>,
    /// Attack origin in the attacker's local space (forward = -Z)
    pub attack_point: Vec3,
    pub damageable_layers: Group,
    pub obstacle_layers: Group,
    pub trigger: AttackTrigger,
    /// Refuse non-forced attacks when nothing valid is in range
    pub require_targets: bool,
    phase: AttackPhase,
    attack_index: usize,
    started_at: f32,
    last_attack_time: Option<f32>,
    ledger: HitLedger,
}

impl Default for MeleeWeapon {
    fn default() -> Self {
        Self::new("Claws", vec![MeleeAttackProfile::default()])
    }
}

impl MeleeWeapon {
    /// An empty profile list is replaced by one default profile.
    pub fn new(name: impl Into<String>, profiles: Vec<MeleeAttackProfile>) -> Self {
        let name = name.into();
        let profiles = if profiles.is_empty() {
            crate::logger::log_warning(&format!(
                "⚠️ MeleeWeapon '{}': no attack profiles, using default attack",
                name
            ));
            vec![MeleeAttackProfile::default()]
        } else {
            profiles
        };

        Self {
            name,
            profiles,
            attack_point: Vec3::new(0.0, 1.0, -0.5),
            damageable_layers: DAMAGEABLE_LAYER,
            obstacle_layers: OBSTACLE_LAYER,
            trigger: AttackTrigger::Timed,
            require_targets: true,
            phase: AttackPhase::Ready,
            attack_index: 0,
            started_at: 0.0,
            last_attack_time: None,
            ledger: HitLedger::default(),
        }
    }

    pub fn with_trigger(mut self, trigger: AttackTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_attack_point(mut self, attack_point: Vec3) -> Self {
        self.attack_point = attack_point;
        self
    }

    pub fn with_layers(mut self, damageable: Group, obstacles: Group) -> Self {
        self.damageable_layers = damageable;
        self.obstacle_layers = obstacles;
        self
    }

    pub fn requiring_targets(mut self, require: bool) -> Self {
        self.require_targets = require;
        self
    }

    pub fn profiles(&self) -> &[MeleeAttackProfile] {
        &self.profiles
    }

    pub fn phase(&self) -> AttackPhase {
        self.phase
    }

    pub fn attack_index(&self) -> usize {
        self.attack_index
    }

    pub fn ledger(&self) -> &HitLedger {
        &self.ledger
    }

    pub fn last_attack_time(&self) -> Option<f32> {
        self.last_attack_time
    }

    /// Profile of the current (or most recent) attack.
    pub fn current_profile(&self) -> &MeleeAttackProfile {
        let index = self.attack_index.min(self.profiles.len().saturating_sub(1));
        &self.profiles[index]
    }

    pub fn is_active(&self) -> bool {
        self.phase == AttackPhase::Active
    }

    /// Ready and the cooldown since the last attack start has elapsed.
    pub fn can_attack(&self, now: f32) -> bool {
        self.phase == AttackPhase::Ready && self.remaining_cooldown(now) <= 0.0
    }

    /// Seconds until the next attack may start; infinite while mid-attack.
    pub fn remaining_cooldown(&self, now: f32) -> f32 {
        if self.phase != AttackPhase::Ready {
            return f32::INFINITY;
        }

        self.last_attack_time
            .map_or(0.0, |last| (self.current_profile().cooldown - (now - last)).max(0.0))
    }

    fn check_start(&self, index: usize, now: f32) -> Result<(), AttackRejected> {
        if self.phase != AttackPhase::Ready {
            return Err(AttackRejected::Busy(self.phase));
        }

        let remaining = self.remaining_cooldown(now);
        if remaining > 0.0 {
            return Err(AttackRejected::CoolingDown { remaining });
        }

        if index >= self.profiles.len() {
            return Err(AttackRejected::UnknownProfile {
                index,
                count: self.profiles.len(),
            });
        }

        Ok(())
    }

    /// Start attack `index` if allowed.
    ///
    /// `has_target` is asked (with the selected profile) only when the weapon
    /// requires targets.
    pub fn try_start_attack(
        &mut self,
        index: usize,
        now: f32,
        has_target: impl FnOnce(&MeleeAttackProfile) -> bool,
    ) -> Result<(), AttackRejected> {
        self.check_start(index, now)?;

        if self.require_targets && !has_target(&self.profiles[index]) {
            return Err(AttackRejected::NoTargets);
        }

        self.begin(index, now);
        Ok(())
    }

    /// Start attack `index` without the target pre-check (cooldown and phase still apply).
    pub fn force_start_attack(&mut self, index: usize, now: f32) -> Result<(), AttackRejected> {
        self.check_start(index, now)?;
        self.begin(index, now);
        Ok(())
    }

    fn begin(&mut self, index: usize, now: f32) {
        self.attack_index = index;
        self.last_attack_time = Some(now);
        self.started_at = now;
        self.ledger.clear();

        // Animation-driven weapons stay Ready; damage comes from trigger events
        if self.trigger == AttackTrigger::Timed {
            self.phase = AttackPhase::Windup;
        }
    }

    /// Time since the current attack started.
    pub fn elapsed(&self, now: f32) -> f32 {
        now - self.started_at
    }

    /// 0..1 progress through the windup (1 outside of it).
    pub fn windup_progress(&self, now: f32) -> f32 {
        if self.phase != AttackPhase::Windup {
            return 1.0;
        }

        let windup = self.current_profile().windup_time;
        if windup <= 0.0 {
            return 1.0;
        }
        (self.elapsed(now) / windup).clamp(0.0, 1.0)
    }

    /// Advance at most one phase, using elapsed time since attack start.
    pub fn advance(&mut self, now: f32) -> Option<PhaseChange> {
        let profile = self.current_profile();
        let elapsed = self.elapsed(now);

        let due = match self.phase {
            AttackPhase::Ready => false,
            AttackPhase::Windup => elapsed >= profile.windup_time,
            AttackPhase::Active => elapsed >= profile.active_end(),
            AttackPhase::Recovery => elapsed >= profile.total_duration(),
        };

        if !due {
            return None;
        }

        let change = PhaseChange {
            from: self.phase,
            to: self.phase.next(),
        };
        self.phase = change.to;
        Some(change)
    }

    /// Hit detection against everything not yet in the ledger.
    ///
    /// Candidates are filtered by cone, line of sight and validity (not the
    /// attacker, has health); survivors are recorded and returned.
    pub fn resolve_hits(
        &mut self,
        attacker: Entity,
        origin: Vec3,
        forward: Vec3,
        spatial: &impl SpatialQuery,
        has_health: impl Fn(Entity) -> bool,
    ) -> Vec<MeleeHit> {
        let profile = self.current_profile().clone();
        let mut hits = Vec::new();

        for candidate in spatial.overlap_sphere(origin, profile.range, self.damageable_layers) {
            if self.ledger.contains(candidate.owner) {
                continue;
            }

            if !in_attack_cone(origin, forward, candidate.position, profile.half_cone_degrees()) {
                continue;
            }

            if spatial.segment_blocked(origin, candidate.position, self.obstacle_layers) {
                continue;
            }

            if !is_valid_target(attacker, &candidate, &has_health) {
                continue;
            }

            if self.ledger.record(candidate.owner) {
                hits.push(MeleeHit {
                    target: candidate.owner,
                    collider: candidate.collider,
                    position: candidate.position,
                    direction: (candidate.position - origin).normalize_or_zero(),
                });
            }
        }

        hits
    }
}

/// Target within half the cone angle of forward, measured in the horizontal
/// plane (bodies only yaw, so height differences never leave the cone).
/// A target straight above or below the origin counts as inside.
pub fn in_attack_cone(origin: Vec3, forward: Vec3, target: Vec3, half_cone_degrees: f32) -> bool {
    let flat = |v: Vec3| Vec3::new(v.x, 0.0, v.z);
    let to_target = flat(target - origin);
    let forward = flat(forward);
    if to_target.length_squared() < 1e-6 || forward.length_squared() < 1e-6 {
        return true;
    }

    forward.angle_between(to_target).to_degrees() <= half_cone_degrees
}

/// Not the attacker itself and backed by a health capability.
pub fn is_valid_target(attacker: Entity, candidate: &Candidate, has_health: impl Fn(Entity) -> bool) -> bool {
    candidate.owner != attacker && candidate.collider != attacker && has_health(candidate.owner)
}

// ============================================================================
// Reactions
// ============================================================================

/// Windup telegraph (present only during Windup).
///
/// Visual layers read `progress` to drive the material swap / glow.
#[derive(Component, Clone, Copy, Debug, Default, Reflect)]
#[reflect(Component)]
pub struct WindupTelegraph {
    pub progress: f32,
}

/// Stun state (applied by a hit whose profile has `stun > 0`).
///
/// Stunned agents keep their behavior state but issue no actions.
#[derive(Component, Clone, Copy, Debug, Reflect)]
#[reflect(Component)]
pub struct Stunned {
    /// Time remaining (seconds)
    pub remaining: f32,
}

impl Stunned {
    pub fn new(duration: f32) -> Self {
        Self { remaining: duration }
    }

    /// Longer stun wins.
    pub fn refresh(&mut self, duration: f32) {
        self.remaining = self.remaining.max(duration);
    }

    pub fn is_stunned(&self) -> bool {
        self.remaining > 0.0
    }
}
