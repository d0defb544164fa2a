//! Interactors: the per-operation-class glue between an actor's intent, its
//! penalty, and the arena commit.
//!
//! Each interactor owns one [`PenaltyHandler`].  One call to
//! [`Interactor::step`] advances a single actor through
//!
//! ```text
//!   idle ──wants + precondition──► serving ──satisfied──► re-check ──► commit
//!                                     │                      │
//!                                     └──abort──► idle       └─mismatch──► vanished
//! ```
//!
//! The re-check runs under the lock that guards the target, so two actors
//! whose penalties finish in the same tick cannot both commit on one block.

use swarm_core::{BlockId, EntityId, Tick, invariant_failed};
use swarm_penalty::{PenaltyHandler, PenaltyRecord};
use tracing::{debug, warn};

use crate::host::{ForagingActor, OpKind};
use crate::locking::LockSet;
use crate::map::ArenaMap;
use crate::ops::{ArenaOp, OpOutcome, notify};

/// What one `step` did for one actor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InteractorStatus {
    /// Nothing to do.
    NoEvent,
    /// A penalty of `duration` ticks started.
    PenaltyStarted { duration: u64 },
    /// Still serving.
    Waiting,
    /// The penalty was served and the commit ran.
    Finished(OpOutcome),
    /// The actor gave up its pending operation.
    Aborted,
}

pub trait Interactor: Send + Sync {
    fn kind(&self) -> OpKind;

    fn handler(&self) -> &PenaltyHandler;

    fn step(&self, map: &ArenaMap, actor: &mut dyn ForagingActor, t: Tick) -> InteractorStatus;
}

// ── Shared gate ───────────────────────────────────────────────────────────────

enum Gate {
    Done(InteractorStatus),
    Ready(PenaltyRecord),
}

/// The part of `step` every interactor shares.  `target` evaluates the
/// precondition and names the entity the penalty is for.
fn penalty_gate<F>(handler: &PenaltyHandler, kind: OpKind, actor: &dyn ForagingActor, t: Tick, target: F) -> Gate
where
    F: FnOnce() -> Option<EntityId>,
{
    let id = actor.id();
    if let Some(record) = handler.penalty_find(id) {
        if actor.wants_abort(kind) {
            handler.penalty_abort(id);
            return Gate::Done(InteractorStatus::Aborted);
        }
        if record.is_satisfied(t) {
            return Gate::Ready(record);
        }
        return Gate::Done(InteractorStatus::Waiting);
    }
    if !actor.wants(kind) {
        return Gate::Done(InteractorStatus::NoEvent);
    }
    match target() {
        Some(entity) => {
            let duration = handler.penalty_init(id, entity, t);
            Gate::Done(InteractorStatus::PenaltyStarted { duration })
        }
        None => Gate::Done(InteractorStatus::NoEvent),
    }
}

/// Penalty served: drop the record, then run the actor phase.
fn finish(handler: &PenaltyHandler, actor: &mut dyn ForagingActor, outcome: OpOutcome, t: Tick) -> InteractorStatus {
    handler.penalty_remove(actor.id());
    notify(actor, &outcome, t);
    InteractorStatus::Finished(outcome)
}

/// The penalty was started for a block the actor no longer carries.
fn carried_or_abort(handler: &PenaltyHandler, actor: &dyn ForagingActor) -> Option<BlockId> {
    let block = actor.carried_block();
    if block.is_none() {
        warn!(handler = handler.name(), actor = %actor.id(), "served penalty without a carried block");
        handler.penalty_abort(actor.id());
    }
    block
}

fn record_block(record: &PenaltyRecord) -> BlockId {
    match record.id.block() {
        Some(b) => b,
        None => invariant_failed!("{} penalty record {record} does not name a block", record.actor),
    }
}

macro_rules! interactor {
    ($(#[$attr:meta])* $name:ident, $kind:expr) => {
        $(#[$attr])*
        pub struct $name {
            handler: PenaltyHandler,
        }

        impl $name {
            pub fn new(handler: PenaltyHandler) -> Self {
                Self { handler }
            }

            /// An interactor with a penalty handler named after its
            /// operation class.
            pub fn with_waveform(waveform: Box<dyn swarm_penalty::Waveform>) -> Self {
                Self::new(PenaltyHandler::new($kind.name(), waveform))
            }
        }

        impl Interactor for $name {
            #[inline]
            fn kind(&self) -> OpKind {
                $kind
            }

            #[inline]
            fn handler(&self) -> &PenaltyHandler {
                &self.handler
            }

            fn step(&self, map: &ArenaMap, actor: &mut dyn ForagingActor, t: Tick) -> InteractorStatus {
                self.step_impl(map, actor, t)
            }
        }
    };
}

// ── Free block pickup ─────────────────────────────────────────────────────────

interactor!(
    /// Picking up a free block the actor is standing on.
    BlockPickupInteractor,
    OpKind::FreeBlockPickup
);

impl BlockPickupInteractor {
    fn step_impl(&self, map: &ArenaMap, actor: &mut dyn ForagingActor, t: Tick) -> InteractorStatus {
        let (pos, acquired) = (actor.position(), actor.acquired_entity());
        let carrying = actor.carried_block().is_some();
        let gate = penalty_gate(&self.handler, self.kind(), actor, t, || {
            if carrying {
                return None;
            }
            map.robot_on_block(pos, acquired).map(EntityId::Block)
        });
        let record = match gate {
            Gate::Done(status) => return status,
            Gate::Ready(record) => record,
        };
        let block = record_block(&record);
        let me = actor.id();

        let locks = map.lock_blocks();
        let on = locks.blocks().robot_on_block(actor.position(), actor.acquired_entity());
        let outcome = if on != Some(block) {
            drop(locks);
            warn!(%block, actor = %me, tick = %t, "block vanished while serving pickup penalty");
            OpOutcome::BlockVanished { block }
        } else {
            let (locks, outcome) = map.apply(ArenaOp::FreeBlockPickup { block, actor: me, tick: t }, locks);
            drop(locks);
            outcome
        };
        finish(&self.handler, actor, outcome, t)
    }
}

// ── Nest drop ─────────────────────────────────────────────────────────────────

interactor!(
    /// Delivering a carried block to a nest.
    NestDropInteractor,
    OpKind::NestBlockDrop
);

impl NestDropInteractor {
    fn step_impl(&self, map: &ArenaMap, actor: &mut dyn ForagingActor, t: Tick) -> InteractorStatus {
        let pos = actor.position();
        let carried = actor.carried_block();
        let gate = penalty_gate(&self.handler, self.kind(), actor, t, || {
            carried?;
            map.nest_at(pos).map(EntityId::Nest)
        });
        if let Gate::Done(status) = gate {
            return status;
        }
        let Some(block) = carried_or_abort(&self.handler, actor) else {
            return InteractorStatus::Aborted;
        };
        let (locks, outcome) = map.apply(ArenaOp::NestBlockDrop { block, actor: actor.id(), tick: t }, LockSet::none());
        drop(locks);
        finish(&self.handler, actor, outcome, t)
    }
}

// ── Free block drop ───────────────────────────────────────────────────────────

interactor!(
    /// Dropping a carried block on the cell under the actor.
    FreeBlockDropInteractor,
    OpKind::FreeBlockDrop
);

impl FreeBlockDropInteractor {
    fn step_impl(&self, map: &ArenaMap, actor: &mut dyn ForagingActor, t: Tick) -> InteractorStatus {
        let pos = actor.position();
        let carried = actor.carried_block();
        let gate = penalty_gate(&self.handler, self.kind(), actor, t, || {
            let block = carried?;
            if map.nest_at(pos).is_some() || map.robot_on_cache(pos).is_some() {
                return None;
            }
            let at = pos.discretize(map.resolution());
            (!map.placement_conflict(block, at)).then_some(EntityId::Block(block))
        });
        if let Gate::Done(status) = gate {
            return status;
        }
        let Some(block) = carried_or_abort(&self.handler, actor) else {
            return InteractorStatus::Aborted;
        };
        let loc = actor.position().discretize(map.resolution());
        let op = ArenaOp::FreeBlockDrop { block, actor: actor.id(), loc, tick: t };
        let (locks, outcome) = map.apply(op, LockSet::none());
        drop(locks);
        finish(&self.handler, actor, outcome, t)
    }
}

// ── Cache interactions ────────────────────────────────────────────────────────

interactor!(
    /// Taking a block from the cache the actor is on.
    CachedBlockPickupInteractor,
    OpKind::CachedBlockPickup
);

impl CachedBlockPickupInteractor {
    fn step_impl(&self, map: &ArenaMap, actor: &mut dyn ForagingActor, t: Tick) -> InteractorStatus {
        let pos = actor.position();
        let carrying = actor.carried_block().is_some();
        let gate = penalty_gate(&self.handler, self.kind(), actor, t, || {
            if carrying {
                return None;
            }
            map.robot_on_cache(pos).map(EntityId::Cache)
        });
        let record = match gate {
            Gate::Done(status) => return status,
            Gate::Ready(record) => record,
        };
        let Some(cache) = record.id.cache() else {
            invariant_failed!("{} penalty record {record} does not name a cache", record.actor);
        };
        let me = actor.id();

        let locks = map.lock_caches();
        let outcome = if locks.caches().robot_on_cache(actor.position()) != Some(cache) {
            drop(locks);
            warn!(%cache, actor = %me, tick = %t, "cache vanished while serving pickup penalty");
            OpOutcome::CacheVanished { cache }
        } else {
            let (locks, outcome) = map.apply(ArenaOp::CachedBlockPickup { cache, actor: me, tick: t }, locks);
            drop(locks);
            outcome
        };
        finish(&self.handler, actor, outcome, t)
    }
}

interactor!(
    /// Adding a carried block to the cache the actor is on.
    CacheBlockDropInteractor,
    OpKind::CacheBlockDrop
);

impl CacheBlockDropInteractor {
    fn step_impl(&self, map: &ArenaMap, actor: &mut dyn ForagingActor, t: Tick) -> InteractorStatus {
        let pos = actor.position();
        let carried = actor.carried_block();
        let gate = penalty_gate(&self.handler, self.kind(), actor, t, || {
            carried?;
            map.robot_on_cache(pos).map(EntityId::Cache)
        });
        let record = match gate {
            Gate::Done(status) => return status,
            Gate::Ready(record) => record,
        };
        let Some(cache) = record.id.cache() else {
            invariant_failed!("{} penalty record {record} does not name a cache", record.actor);
        };
        let Some(block) = carried_or_abort(&self.handler, actor) else {
            return InteractorStatus::Aborted;
        };
        let me = actor.id();

        let locks = map.lock_caches();
        let outcome = if locks.caches().robot_on_cache(actor.position()) != Some(cache) {
            drop(locks);
            warn!(%cache, actor = %me, tick = %t, "cache vanished while serving drop penalty");
            OpOutcome::CacheVanished { cache }
        } else {
            let (locks, outcome) = map.apply(ArenaOp::CacheBlockDrop { block, cache, actor: me, tick: t }, locks);
            drop(locks);
            outcome
        };
        finish(&self.handler, actor, outcome, t)
    }
}

/// The interactor serving `kind`.
pub fn interactor_for(kind: OpKind, handler: PenaltyHandler) -> Box<dyn Interactor> {
    match kind {
        OpKind::FreeBlockPickup => Box::new(BlockPickupInteractor::new(handler)),
        OpKind::FreeBlockDrop => Box::new(FreeBlockDropInteractor::new(handler)),
        OpKind::NestBlockDrop => Box::new(NestDropInteractor::new(handler)),
        OpKind::CachedBlockPickup => Box::new(CachedBlockPickupInteractor::new(handler)),
        OpKind::CacheBlockDrop => Box::new(CacheBlockDropInteractor::new(handler)),
    }
}

/// One interactor per operation class; `make` supplies each handler's
/// waveform.
pub fn standard_interactors<F>(mut make: F) -> Vec<Box<dyn Interactor>>
where
    F: FnMut(OpKind) -> Box<dyn swarm_penalty::Waveform>,
{
    let set: Vec<Box<dyn Interactor>> = OpKind::ALL
        .into_iter()
        .map(|kind| interactor_for(kind, PenaltyHandler::new(kind.name(), make(kind))))
        .collect();
    debug!(n = set.len(), "interactors built");
    set
}
