//! AI components

pub mod fsm;
pub mod locomotion;
pub mod patrol;
pub mod perception;


// Re-export all components
pub use fsm::*;
pub use locomotion::*;
pub use patrol::*;
pub use perception::*;
