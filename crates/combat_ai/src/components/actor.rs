//! Damageable capability: Health

use bevy::prelude::*;

/// Health of a damageable entity.
///
/// Invariant: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
    /// Who dealt the most recent damage (for kill credit / reactions)
    pub last_attacker: Option<Entity>,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self {
            current: max,
            max,
            last_attacker: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Apply damage from `attacker`, returns the amount actually removed.
    pub fn take_damage(&mut self, amount: u32, attacker: Option<Entity>) -> u32 {
        let before = self.current;
        self.current = self.current.saturating_sub(amount);
        if attacker.is_some() {
            self.last_attacker = attacker;
        }
        before - self.current
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }
}
