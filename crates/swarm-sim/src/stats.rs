//! Per-tick tallies of what the interactors did.

use std::fmt;
use std::ops::AddAssign;

use swarm_arena::{InteractorStatus, OpOutcome};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickStats {
    /// Penalties started this tick.
    pub started: usize,
    /// Actors still serving a penalty.
    pub waiting: usize,
    /// Blocks taken off the floor or out of a cache.
    pub pickups: usize,
    /// Blocks left on the floor or in a cache.
    pub drops: usize,
    /// Blocks delivered to a nest.
    pub nest_drops: usize,
    /// Caches emptied by a pickup.
    pub depletions: usize,
    /// Served penalties whose target had gone.
    pub vanished: usize,
    /// Served drops that found the floor occupied.
    pub conflicts: usize,
    pub aborted: usize,
}

impl TickStats {
    pub fn record(&mut self, status: &InteractorStatus) {
        match status {
            InteractorStatus::NoEvent => {}
            InteractorStatus::PenaltyStarted { .. } => self.started += 1,
            InteractorStatus::Waiting => self.waiting += 1,
            InteractorStatus::Aborted => self.aborted += 1,
            InteractorStatus::Finished(outcome) => self.record_outcome(outcome),
        }
    }

    fn record_outcome(&mut self, outcome: &OpOutcome) {
        match *outcome {
            OpOutcome::BlockPickedUp { .. } => self.pickups += 1,
            OpOutcome::CachedBlockPickedUp { depleted, .. } => {
                self.pickups += 1;
                if depleted {
                    self.depletions += 1;
                }
            }
            OpOutcome::BlockDropped { .. } | OpOutcome::CacheBlockDropped { .. } => self.drops += 1,
            OpOutcome::NestDropped { .. } => self.nest_drops += 1,
            OpOutcome::BlockVanished { .. } | OpOutcome::CacheVanished { .. } => self.vanished += 1,
            OpOutcome::DropConflict { .. } => self.conflicts += 1,
        }
    }

    /// Operations that changed the arena.
    #[inline]
    pub fn committed(&self) -> usize {
        self.pickups + self.drops + self.nest_drops
    }

    #[inline]
    pub fn merge(mut self, other: TickStats) -> TickStats {
        self += other;
        self
    }
}

impl AddAssign for TickStats {
    fn add_assign(&mut self, o: TickStats) {
        self.started += o.started;
        self.waiting += o.waiting;
        self.pickups += o.pickups;
        self.drops += o.drops;
        self.nest_drops += o.nest_drops;
        self.depletions += o.depletions;
        self.vanished += o.vanished;
        self.conflicts += o.conflicts;
        self.aborted += o.aborted;
    }
}

impl fmt::Display for TickStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "started={} waiting={} pickups={} drops={} nest_drops={} vanished={} conflicts={} aborted={}",
            self.started,
            self.waiting,
            self.pickups,
            self.drops,
            self.nest_drops,
            self.vanished,
            self.conflicts,
            self.aborted
        )
    }
}
