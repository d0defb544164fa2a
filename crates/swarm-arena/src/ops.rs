//! Arena operations and the two-phase commit.
//!
//! Every mutation an actor can cause is an [`ArenaOp`].  Committing one runs
//! in two phases:
//!
//! 1. **Arena**: [`ArenaMap::apply`] takes the locks the op needs, mutates
//!    the grid and stores, and hands the caller's locks back.  The caller
//!    then releases them.
//! 2. **Actor**: [`notify`] runs the matching [`ForagingActor`] callback.
//!    No arena lock is held here.

use std::fmt;

use swarm_core::{ActorId, BlockId, CacheId, Tick, Vec2z, invariant, invariant_failed};
use swarm_repr::{BlockPlacement, CACHE_MIN_BLOCKS, SpatialEntity};
use tracing::{debug, warn};

use crate::host::ForagingActor;
use crate::locking::{Held, LockSet};
use crate::map::ArenaMap;

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArenaOp {
    FreeBlockPickup { block: BlockId, actor: ActorId, tick: Tick },
    /// Drop a carried block with its anchor at `loc`.
    FreeBlockDrop { block: BlockId, actor: ActorId, loc: Vec2z, tick: Tick },
    /// Deliver a carried block to a nest; it is redistributed at once.
    NestBlockDrop { block: BlockId, actor: ActorId, tick: Tick },
    CachedBlockPickup { cache: CacheId, actor: ActorId, tick: Tick },
    CacheBlockDrop { block: BlockId, cache: CacheId, actor: ActorId, tick: Tick },
}

impl ArenaOp {
    pub fn tick(&self) -> Tick {
        match *self {
            ArenaOp::FreeBlockPickup { tick, .. }
            | ArenaOp::FreeBlockDrop { tick, .. }
            | ArenaOp::NestBlockDrop { tick, .. }
            | ArenaOp::CachedBlockPickup { tick, .. }
            | ArenaOp::CacheBlockDrop { tick, .. } => tick,
        }
    }

    pub fn actor(&self) -> ActorId {
        match *self {
            ArenaOp::FreeBlockPickup { actor, .. }
            | ArenaOp::FreeBlockDrop { actor, .. }
            | ArenaOp::NestBlockDrop { actor, .. }
            | ArenaOp::CachedBlockPickup { actor, .. }
            | ArenaOp::CacheBlockDrop { actor, .. } => actor,
        }
    }

    /// Locks `apply` takes for this op.
    fn needs(&self) -> Held {
        match self {
            // The pickup path takes the grid itself and drops it early.
            ArenaOp::FreeBlockPickup { .. } => Held::BLOCKS,
            ArenaOp::FreeBlockDrop { .. } => Held::BLOCKS_GRID,
            ArenaOp::CacheBlockDrop { .. } => Held::CACHES | Held::BLOCKS,
            ArenaOp::NestBlockDrop { .. } | ArenaOp::CachedBlockPickup { .. } => Held::ALL,
        }
    }
}

/// What phase 1 did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpOutcome {
    BlockPickedUp { block: BlockId },
    BlockDropped { block: BlockId, at: Vec2z },
    NestDropped { block: BlockId, redistributed_to: Vec2z },
    /// `depleted` is set when the pickup left a single block and the cache
    /// was removed.
    CachedBlockPickedUp { block: BlockId, cache: CacheId, depleted: bool },
    CacheBlockDropped { block: BlockId, cache: CacheId },
    /// The block was no longer free when the commit ran.
    BlockVanished { block: BlockId },
    /// The cache was no longer active when the commit ran.
    CacheVanished { cache: CacheId },
    /// The drop footprint was blocked; the actor keeps the block.
    DropConflict { block: BlockId, at: Vec2z },
}

impl OpOutcome {
    /// `true` if the arena changed.
    pub fn is_committed(&self) -> bool {
        !matches!(
            self,
            OpOutcome::BlockVanished { .. } | OpOutcome::CacheVanished { .. } | OpOutcome::DropConflict { .. }
        )
    }
}

impl fmt::Display for OpOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpOutcome::BlockPickedUp { block } => write!(f, "picked up {block}"),
            OpOutcome::BlockDropped { block, at } => write!(f, "dropped {block} at {at}"),
            OpOutcome::NestDropped { block, redistributed_to } => {
                write!(f, "delivered {block}, redistributed to {redistributed_to}")
            }
            OpOutcome::CachedBlockPickedUp { block, cache, depleted } => {
                write!(f, "took {block} from {cache}")?;
                if *depleted {
                    write!(f, " (depleted)")?;
                }
                Ok(())
            }
            OpOutcome::CacheBlockDropped { block, cache } => write!(f, "dropped {block} into {cache}"),
            OpOutcome::BlockVanished { block } => write!(f, "{block} vanished"),
            OpOutcome::CacheVanished { cache } => write!(f, "{cache} vanished"),
            OpOutcome::DropConflict { block, at } => write!(f, "{block} cannot be dropped at {at}"),
        }
    }
}

// ── Phase 1 ───────────────────────────────────────────────────────────────────

impl ArenaMap {
    /// Arena side of an op.  Takes what `locks` lacks, returns it with the
    /// caller's guards only.
    pub fn apply<'a>(&'a self, op: ArenaOp, mut locks: LockSet<'a>) -> (LockSet<'a>, OpOutcome) {
        let acquired = locks.acquire(self, op.needs());
        let (locks, outcome) = match op {
            ArenaOp::FreeBlockPickup { block, actor, tick } => {
                if !locks.blocks().block(block).is_free() {
                    (locks, OpOutcome::BlockVanished { block })
                } else {
                    let locks = self.free_block_pickup(block, actor, tick, locks);
                    (locks, OpOutcome::BlockPickedUp { block })
                }
            }
            ArenaOp::FreeBlockDrop { block, actor, loc, tick } => self.free_block_drop(block, actor, loc, tick, locks),
            ArenaOp::NestBlockDrop { block, actor, tick } => self.nest_block_drop(block, actor, tick, locks),
            ArenaOp::CachedBlockPickup { cache, actor, tick } => self.cached_block_pickup(cache, actor, tick, locks),
            ArenaOp::CacheBlockDrop { block, cache, actor, tick } => {
                self.cache_block_drop(block, cache, actor, tick, locks)
            }
        };
        let mut locks = locks;
        locks.release(acquired);
        (locks, outcome)
    }

    fn free_block_drop<'a>(
        &'a self,
        id: BlockId,
        actor: ActorId,
        at: Vec2z,
        t: Tick,
        mut locks: LockSet<'a>,
    ) -> (LockSet<'a>, OpOutcome) {
        let (blocks, grid) = locks.blocks_grid_mut();
        let block = blocks.block_mut(id);
        expect_carried(block.placement(), id, actor);
        let outcome = if self.drop_at(block, at, grid) {
            debug!(block = %id, %actor, %at, tick = %t, "free block dropped");
            OpOutcome::BlockDropped { block: id, at }
        } else {
            warn!(block = %id, %actor, %at, tick = %t, "drop location occupied");
            OpOutcome::DropConflict { block: id, at }
        };
        (locks, outcome)
    }

    fn nest_block_drop<'a>(&'a self, id: BlockId, actor: ActorId, t: Tick, mut locks: LockSet<'a>) -> (LockSet<'a>, OpOutcome) {
        let block = locks.blocks_mut().block_mut(id);
        expect_carried(block.placement(), id, actor);
        block.nest_drop();
        let locks = self.distribute_single_block(id, locks);
        let Some(anchor) = locks.blocks().block(id).danchor() else {
            invariant_failed!("{id} still out of sight after redistribution");
        };
        debug!(block = %id, %actor, tick = %t, redistributed_to = %anchor, "block delivered to nest");
        (locks, OpOutcome::NestDropped { block: id, redistributed_to: anchor })
    }

    fn cached_block_pickup<'a>(
        &'a self,
        cache_id: CacheId,
        actor: ActorId,
        t: Tick,
        mut locks: LockSet<'a>,
    ) -> (LockSet<'a>, OpOutcome) {
        let res = self.resolution();
        let (caches, blocks, grid) = locks.all_mut();
        let Some(cache) = caches.get_mut(cache_id) else {
            warn!(cache = %cache_id, %actor, tick = %t, "cache vanished before pickup");
            return (locks, OpOutcome::CacheVanished { cache: cache_id });
        };
        invariant!(
            cache.n_blocks() >= CACHE_MIN_BLOCKS,
            "{cache_id} holds {} blocks, fewer than {CACHE_MIN_BLOCKS}",
            cache.n_blocks()
        );
        let Some(taken) = cache.block_take() else {
            invariant_failed!("{cache_id} is empty");
        };
        blocks.block_mut(taken).pick_up(actor, t);

        let depleted = cache.n_blocks() < CACHE_MIN_BLOCKS;
        if depleted {
            let anchor = cache.extent().anchor;
            let extent = *cache.extent();
            let last = cache.blocks()[0];
            let fp = blocks.block(last).footprint_at(anchor.to_real(res), res);
            // The last block takes over the anchor if its footprint fits in
            // what the cache leaves behind; otherwise it is redistributed.
            let fits = fp.xdspan.ub < grid.xdsize()
                && fp.ydspan.ub < grid.ydsize()
                && fp
                    .extent_cells()
                    .all(|c| extent.contains_cell(c) || grid.state(c).is_claimable());
            if fits {
                grid.convert_cache_to_block(anchor, last);
                caches.remove(cache_id, grid, self.host());
                let block = blocks.block_mut(last);
                block.place(fp);
                for c in fp.extent_cells() {
                    grid.mark_block_extent(c, last);
                }
                self.block_placed(block, anchor, grid);
            } else {
                grid.mark_empty(anchor);
                caches.remove(cache_id, grid, self.host());
                blocks.block_mut(last).hide();
                locks = self.distribute_single_block(last, locks);
            }
            debug!(cache = %cache_id, last = %last, tick = %t, "cache depleted");
        }
        debug!(block = %taken, cache = %cache_id, %actor, tick = %t, "cached block picked up");
        (locks, OpOutcome::CachedBlockPickedUp { block: taken, cache: cache_id, depleted })
    }

    fn cache_block_drop<'a>(
        &'a self,
        id: BlockId,
        cache_id: CacheId,
        actor: ActorId,
        t: Tick,
        mut locks: LockSet<'a>,
    ) -> (LockSet<'a>, OpOutcome) {
        {
            let block = locks.blocks().block(id);
            expect_carried(block.placement(), id, actor);
        }
        let Some(cache) = locks.caches_mut().get_mut(cache_id) else {
            warn!(cache = %cache_id, %actor, tick = %t, "cache vanished before drop");
            return (locks, OpOutcome::CacheVanished { cache: cache_id });
        };
        cache.block_add(id);
        locks.blocks_mut().block_mut(id).enter_cache(cache_id);
        debug!(block = %id, cache = %cache_id, %actor, tick = %t, "block dropped into cache");
        (locks, OpOutcome::CacheBlockDropped { block: id, cache: cache_id })
    }
}

fn expect_carried(placement: BlockPlacement, id: BlockId, actor: ActorId) {
    invariant!(
        matches!(placement, BlockPlacement::Carried { by, .. } if by == actor),
        "{id} is {placement:?}, expected carried by {actor}"
    );
}

// ── Phase 2 ───────────────────────────────────────────────────────────────────

/// Run the actor callback for `outcome`.  Must be called without any arena
/// lock held.
pub fn notify(actor: &mut dyn ForagingActor, outcome: &OpOutcome, t: Tick) {
    match *outcome {
        OpOutcome::BlockPickedUp { block } | OpOutcome::CachedBlockPickedUp { block, .. } => {
            actor.on_block_pickup(block, t)
        }
        OpOutcome::BlockDropped { block, .. }
        | OpOutcome::NestDropped { block, .. }
        | OpOutcome::CacheBlockDropped { block, .. } => actor.on_block_drop(block, t),
        OpOutcome::BlockVanished { block } => actor.on_block_vanished(block),
        OpOutcome::CacheVanished { cache } => actor.on_cache_vanished(cache),
        OpOutcome::DropConflict { block, .. } => actor.on_drop_conflict(block),
    }
}

/// Apply `op` starting from the caller's `locks`, release everything, then
/// notify `actor`.
pub fn commit_with<'a>(
    map: &'a ArenaMap,
    op: ArenaOp,
    locks: LockSet<'a>,
    actor: &mut dyn ForagingActor,
) -> OpOutcome {
    let (locks, outcome) = map.apply(op, locks);
    drop(locks);
    notify(actor, &outcome, op.tick());
    outcome
}

/// Apply `op` with no locks pre-held, then notify `actor`.
pub fn commit(map: &ArenaMap, op: ArenaOp, actor: &mut dyn ForagingActor) -> OpOutcome {
    commit_with(map, op, LockSet::none(), actor)
}
