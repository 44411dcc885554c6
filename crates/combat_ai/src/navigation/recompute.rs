//! Staggered recomputation task.
//!
//! Explicit stage machine instead of a "wait N frames" coroutine:
//!
//! ```text
//! Delay(n > 0) ─tick→ Delay(n-1) ... Delay(0) ─same tick→ query solver → Settle(path)
//! Settle(path) ─next tick→ substitute + cache write + apply → task removed
//! ```
//!
//! The task is a component on the agent: despawning the agent drops the task.

use bevy::prelude::*;

use super::cache::GridKey;
use super::solver::NavPath;

#[derive(Debug, Clone, PartialEq)]
pub enum RecomputeStage {
    /// Waiting for the load-spreading delay
    Delay { remaining_ticks: u32 },
    /// Path query issued, result classified on the next tick
    Settle { path: NavPath },
}

/// What the driver should do with the task this tick.
#[derive(Debug, Clone, PartialEq)]
pub enum RecomputePoll {
    Pending,
    QueryDue,
    Ready(NavPath),
}

#[derive(Component, Debug, Clone)]
pub struct PathRecompute {
    /// Destination originally requested
    pub original: Vec3,
    /// Cache cell the result is written to
    pub key: GridKey,
    pub stage: RecomputeStage,
}

impl PathRecompute {
    pub fn new(original: Vec3, key: GridKey, delay_ticks: u32) -> Self {
        Self {
            original,
            key,
            stage: RecomputeStage::Delay {
                remaining_ticks: delay_ticks,
            },
        }
    }

    pub fn poll(&mut self) -> RecomputePoll {
        match &mut self.stage {
            RecomputeStage::Delay { remaining_ticks } if *remaining_ticks > 0 => {
                *remaining_ticks -= 1;
                RecomputePoll::Pending
            }
            RecomputeStage::Delay { .. } => RecomputePoll::QueryDue,
            RecomputeStage::Settle { path } => RecomputePoll::Ready(path.clone()),
        }
    }

    /// Query result arrived; classify it next tick.
    pub fn settle(&mut self, path: NavPath) {
        self.stage = RecomputeStage::Settle { path };
    }
}
