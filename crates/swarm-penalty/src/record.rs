//! A single waiting actor.

use std::fmt;

use swarm_core::{ActorId, EntityId, Tick};

/// An actor waiting `duration` ticks from `start` to operate on `id`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PenaltyRecord {
    pub actor: ActorId,
    /// The entity the operation was requested on.
    pub id: EntityId,
    pub start: Tick,
    pub duration: u64,
}

impl PenaltyRecord {
    /// The first tick at which the penalty is served.
    #[inline]
    pub fn finish(&self) -> Tick {
        self.start + self.duration
    }

    #[inline]
    pub fn is_satisfied(&self, t: Tick) -> bool {
        t >= self.finish()
    }
}

impl fmt::Display for PenaltyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {} from {} for {} ticks",
            self.actor, self.id, self.start, self.duration
        )
    }
}
