//! Combat components

pub mod melee;
pub mod profile;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod melee_tests;

pub use melee::*;
pub use profile::*;
