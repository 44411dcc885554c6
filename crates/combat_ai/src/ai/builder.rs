//! Agent assembly with collaborator validation.
//!
//! An agent cannot function without a detection source and a movement
//! backend, so `spawn` refuses to create one instead of producing an agent
//! that silently stands still. Optional pieces (patrol route, weapon,
//! hurtbox) are simply left out when absent.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{CollisionGroups, Group};
use thiserror::Error;

use crate::ai::{BehaviorConfig, BehaviorState, LocomotionFeedback, PatrolRoute, Perception};
use crate::combat::{Hurtbox, MeleeWeapon, DAMAGEABLE_LAYER};
use crate::components::{Health, NavAgent};
use crate::navigation::{NavOptimizer, NavOptimizerConfig};

/// Agent configuration errors (returned from `AgentBuilder::spawn`).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgentConfigError {
    #[error("agent has no detection source (Perception)")]
    MissingPerception,
    #[error("agent has no movement backend (NavAgent)")]
    MissingMovementBackend,
    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Builder for a hostile agent.
#[derive(Debug, Clone)]
pub struct AgentBuilder {
    transform: Transform,
    perception: Option<Perception>,
    nav_agent: Option<NavAgent>,
    config: BehaviorConfig,
    health: Health,
    patrol: Option<PatrolRoute>,
    weapon: Option<MeleeWeapon>,
    hurtbox: Option<Hurtbox>,
    optimize_navigation: bool,
}

impl AgentBuilder {
    pub fn new(position: Vec3) -> Self {
        Self {
            transform: Transform::from_translation(position),
            perception: None,
            nav_agent: None,
            config: BehaviorConfig::default(),
            health: Health::default(),
            patrol: None,
            weapon: None,
            hurtbox: Some(Hurtbox::default()),
            optimize_navigation: true,
        }
    }

    pub fn with_perception(mut self, perception: Perception) -> Self {
        self.perception = Some(perception);
        self
    }

    pub fn with_nav_agent(mut self, nav_agent: NavAgent) -> Self {
        self.nav_agent = Some(nav_agent);
        self
    }

    pub fn with_config(mut self, config: BehaviorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_health(mut self, health: Health) -> Self {
        self.health = health;
        self
    }

    pub fn with_patrol_route(mut self, route: PatrolRoute) -> Self {
        self.patrol = Some(route);
        self
    }

    pub fn with_weapon(mut self, weapon: MeleeWeapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn with_hurtbox(mut self, hurtbox: Option<Hurtbox>) -> Self {
        self.hurtbox = hurtbox;
        self
    }

    /// Send destinations straight to the backend (no `NavOptimizer`).
    pub fn without_optimizer(mut self) -> Self {
        self.optimize_navigation = false;
        self
    }

    pub fn validate(&self) -> Result<(), AgentConfigError> {
        let perception = self.perception.as_ref().ok_or(AgentConfigError::MissingPerception)?;
        let nav_agent = self.nav_agent.as_ref().ok_or(AgentConfigError::MissingMovementBackend)?;

        if !(perception.attack_range > 0.0) {
            return Err(AgentConfigError::InvalidValue {
                field: "attack_range",
                reason: format!("must be positive, got {}", perception.attack_range),
            });
        }

        if !(0.0..=1.0).contains(&self.config.attack_stop_distance_ratio) {
            return Err(AgentConfigError::InvalidValue {
                field: "attack_stop_distance_ratio",
                reason: format!("must be within 0..=1, got {}", self.config.attack_stop_distance_ratio),
            });
        }

        if !(nav_agent.max_speed > 0.0) {
            return Err(AgentConfigError::InvalidValue {
                field: "max_speed",
                reason: format!("must be positive, got {}", nav_agent.max_speed),
            });
        }

        if self.config.pitch_min > self.config.pitch_max {
            return Err(AgentConfigError::InvalidValue {
                field: "pitch_min",
                reason: format!("{} exceeds pitch_max {}", self.config.pitch_min, self.config.pitch_max),
            });
        }

        Ok(())
    }

    /// Validate and spawn. Nothing is spawned on error.
    pub fn spawn(self, world: &mut World) -> Result<Entity, AgentConfigError> {
        self.validate()?;

        let (Some(perception), Some(nav_agent)) = (self.perception, self.nav_agent) else {
            return Err(AgentConfigError::MissingPerception);
        };

        let check_interval = world
            .get_resource::<NavOptimizerConfig>()
            .map_or_else(|| NavOptimizerConfig::default().path_check_interval, |c| c.path_check_interval);

        let mut agent = world.spawn((
            self.transform,
            BehaviorState::default(),
            self.config,
            perception,
            nav_agent,
            self.health,
            LocomotionFeedback::default(),
        ));

        if let Some(mut route) = self.patrol {
            // Start from the nearest waypoint instead of walking back to the first one
            route.current = route.closest_index(self.transform.translation).unwrap_or(0);
            agent.insert(route);
        }
        if let Some(weapon) = self.weapon {
            agent.insert(weapon);
        }
        if let Some(hurtbox) = self.hurtbox {
            agent.insert((hurtbox, CollisionGroups::new(DAMAGEABLE_LAYER, Group::ALL)));
        }
        if self.optimize_navigation {
            agent.insert(NavOptimizer::new(check_interval));
        }

        let entity = agent.id();
        crate::logger::log_info(&format!("🤖 Agent spawned: {:?} at {:?}", entity, self.transform.translation));
        Ok(entity)
    }
}
