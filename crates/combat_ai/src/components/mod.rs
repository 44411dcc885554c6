//! Shared ECS components
//!
//! Organised by domain:
//! - actor: damageable capability (Health)
//! - movement: movement backend state as seen by the core (NavAgent, PathStatus)
//!
//! Domain-specific components live next to their systems (ai, navigation, combat).

pub mod actor;
pub mod movement;

pub use actor::*;
pub use movement::*;
