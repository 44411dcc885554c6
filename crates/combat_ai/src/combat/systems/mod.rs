//! Combat systems

pub mod damage;
pub mod melee;
pub mod stun;


pub use damage::*;
pub use melee::*;
pub use stun::*;
