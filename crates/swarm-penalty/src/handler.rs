//! `PenaltyHandler` — the per-operation-class waiting list.
//!
//! # Deconfliction
//!
//! When a record is added its duration is adjusted so its finish tick
//! differs from every record already waiting: on any collision the duration
//! grows by one tick and the scan restarts from the first record.  The scan
//! and the insertion happen under one write lock.
//!
//! The restart makes the scan O(n²) in the number of waiting actors.  With
//! one handler per operation class and at most one record per actor, n is
//! bounded by the swarm size.

use std::sync::RwLock;

use swarm_core::sync::{read, write};
use swarm_core::{ActorId, EntityId, Tick, WaveformConfig, invariant, invariant_failed};
use tracing::debug;

use crate::error::PenaltyResult;
use crate::record::PenaltyRecord;
use crate::waveform::{Waveform, waveform_from_config};

pub struct PenaltyHandler {
    name: String,
    waveform: Box<dyn Waveform>,
    records: RwLock<Vec<PenaltyRecord>>,
}

impl PenaltyHandler {
    pub fn new(name: impl Into<String>, waveform: Box<dyn Waveform>) -> Self {
        Self {
            name: name.into(),
            waveform,
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn from_config(name: impl Into<String>, cfg: &WaveformConfig) -> PenaltyResult<Self> {
        Ok(Self::new(name, waveform_from_config(cfg)?))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    // ── Duration ──────────────────────────────────────────────────────────

    /// Base penalty for a request made at `t`: the waveform value floored
    /// and clamped at 0, then bumped to 1 if it is 0.
    ///
    /// A zero-tick penalty would be satisfied and removed within the tick it
    /// was requested, hiding it from the deconfliction scan.
    pub fn penalty_calc(&self, t: Tick) -> u64 {
        let v = self.waveform.value(t);
        let base = if v.is_finite() && v > 0.0 { v.floor() as u64 } else { 0 };
        base.max(1)
    }

    /// Deconflict and insert a record.  Returns the final duration, never
    /// less than one tick.
    ///
    /// The actor must not already be serving a penalty in this handler.
    pub fn penalty_add(&self, actor: ActorId, id: EntityId, duration: u64, start: Tick) -> u64 {
        let mut records = write(&self.records, &self.name);
        invariant!(
            !records.iter().any(|r| r.actor == actor),
            "{actor} already serving a {} penalty",
            self.name
        );
        let duration = uniqueify(&records, start, duration.max(1));
        records.push(PenaltyRecord { actor, id, start, duration });
        debug!(handler = %self.name, %actor, %id, %start, duration, "penalty added");
        duration
    }

    /// Compute the base penalty at `t` and add it.
    pub fn penalty_init(&self, actor: ActorId, id: EntityId, t: Tick) -> u64 {
        self.penalty_add(actor, id, self.penalty_calc(t), t)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn is_serving_penalty(&self, actor: ActorId) -> bool {
        read(&self.records, &self.name).iter().any(|r| r.actor == actor)
    }

    /// `false` if the actor is not serving a penalty at all.
    pub fn is_penalty_satisfied(&self, actor: ActorId, t: Tick) -> bool {
        read(&self.records, &self.name)
            .iter()
            .find(|r| r.actor == actor)
            .is_some_and(|r| r.is_satisfied(t))
    }

    pub fn penalty_find(&self, actor: ActorId) -> Option<PenaltyRecord> {
        read(&self.records, &self.name)
            .iter()
            .find(|r| r.actor == actor)
            .copied()
    }

    /// The oldest waiting record.
    pub fn penalty_next(&self) -> Option<PenaltyRecord> {
        read(&self.records, &self.name).first().copied()
    }

    pub fn len(&self) -> usize {
        read(&self.records, &self.name).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every waiting record, oldest first.
    pub fn records(&self) -> Vec<PenaltyRecord> {
        read(&self.records, &self.name).clone()
    }

    // ── Removal ───────────────────────────────────────────────────────────

    /// Remove the actor's record after its commit path ran.  Exactly once per
    /// record; removing a record that does not exist is fatal.
    pub fn penalty_remove(&self, actor: ActorId) -> PenaltyRecord {
        let mut records = write(&self.records, &self.name);
        let Some(pos) = records.iter().position(|r| r.actor == actor) else {
            invariant_failed!("{actor} has no {} penalty to remove", self.name);
        };
        let r = records.remove(pos);
        debug!(handler = %self.name, %actor, id = %r.id, "penalty removed");
        r
    }

    /// Drop the actor's record without committing.  A no-op if it has none.
    pub fn penalty_abort(&self, actor: ActorId) -> Option<PenaltyRecord> {
        let mut records = write(&self.records, &self.name);
        let pos = records.iter().position(|r| r.actor == actor)?;
        let r = records.remove(pos);
        debug!(handler = %self.name, %actor, id = %r.id, "penalty aborted");
        Some(r)
    }
}

/// Smallest `d ≥ duration` such that `start + d` matches no waiting record's
/// finish tick.
fn uniqueify(records: &[PenaltyRecord], start: Tick, mut duration: u64) -> u64 {
    let mut i = 0;
    while i < records.len() {
        if records[i].finish() == start + duration {
            duration += 1;
            i = 0;
        } else {
            i += 1;
        }
    }
    duration
}
