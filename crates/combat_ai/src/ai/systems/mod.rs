//! AI systems

pub mod actions;
pub mod fsm;
pub mod reactions;

// Re-export all systems
pub use actions::*;
pub use fsm::*;
pub use reactions::*;
