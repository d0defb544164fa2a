//! `ArenaMap` — the shared arena and its lock-aware mutation paths.
//!
//! # Locks
//!
//! | Field        | Guard      | Protects                                  |
//! |--------------|------------|-------------------------------------------|
//! | `caches`     | `RwLock`   | active caches, zombies, cache R-tree      |
//! | `blocks`     | `RwLock`   | every `Block` and its placement           |
//! | `grid`       | `RwLock`   | cell states and entity references         |
//! | `dispatcher` | `Mutex`    | distributors and cluster bookkeeping      |
//! | `rng`        | `Mutex`    | the distribution RNG                      |
//!
//! Acquisition order is the table order.  Nests never change after
//! construction and are read without a lock.
//!
//! The read accessors ([`grid`](ArenaMap::grid), [`blocks`](ArenaMap::blocks),
//! [`caches`](ArenaMap::caches)) return shared guards.  Holding one while
//! calling a mutating entry point on the same thread deadlocks.

use std::sync::{Mutex, RwLock, RwLockReadGuard};

use swarm_core::sync::{lock, read};
use swarm_core::{
    ActorId, ArenaConfig, ArenaRng, BlockId, CacheId, EntityId, EntityRef, NestId, RealRect, Tick,
    Vec2d, Vec2z, invariant, invariant_failed,
};
use swarm_dist::{BlockDistributor, DistContext, Dispatcher};
use swarm_grid::ArenaGrid;
use swarm_repr::{Block, BlockPlacement, Cache, Footprint, Nest, SpatialEntity};
use tracing::{debug, info};

use crate::caching::{CacheSpec, CacheStore};
use crate::error::{ArenaError, ArenaResult};
use crate::host::HostRegistry;
use crate::locking::{Held, LockSet};
use crate::store::BlockStore;

pub struct ArenaMap {
    pub(crate) caches: RwLock<CacheStore>,
    pub(crate) blocks: RwLock<BlockStore>,
    pub(crate) grid: RwLock<ArenaGrid>,
    dispatcher: Mutex<Dispatcher>,
    rng: Mutex<ArenaRng>,
    nests: Vec<Nest>,
    resolution: f64,
    strict_dist: bool,
    host: Box<dyn HostRegistry>,
}

impl ArenaMap {
    /// Build an arena from `cfg`: grid, nests, the block set (all out of
    /// sight) and the distributor set.  Blocks are not distributed yet.
    pub fn new(cfg: &ArenaConfig, host: Box<dyn HostRegistry>) -> ArenaResult<Self> {
        cfg.validate()?;
        let res = cfg.grid.resolution;
        let mut grid = ArenaGrid::from_config(&cfg.grid);

        let nests: Vec<Nest> = cfg
            .nests
            .iter()
            .enumerate()
            .map(|(i, n)| Nest::new(NestId(i as u32), n.center, n.dims, res))
            .collect();
        for nest in &nests {
            grid.set_nest_extent(nest);
            grid.verify_entity(nest);
        }

        let blocks = BlockStore::from_manifest(&cfg.blocks.manifest);
        let dispatcher = Dispatcher::new(&cfg.blocks, &grid)?;

        info!(
            xdsize = grid.xdsize(),
            ydsize = grid.ydsize(),
            resolution = res,
            n_blocks = blocks.len(),
            n_nests = nests.len(),
            "arena constructed"
        );
        Ok(Self {
            caches: RwLock::new(CacheStore::new()),
            blocks: RwLock::new(blocks),
            grid: RwLock::new(grid),
            dispatcher: Mutex::new(dispatcher),
            rng: Mutex::new(ArenaRng::new(cfg.seed)),
            nests,
            resolution: res,
            strict_dist: cfg.blocks.strict_success,
            host,
        })
    }

    // ── Locks ─────────────────────────────────────────────────────────────

    /// A token holding the locks in `need`.
    pub fn lock(&self, need: Held) -> LockSet<'_> {
        let mut locks = LockSet::none();
        locks.acquire(self, need);
        locks
    }

    pub fn lock_blocks(&self) -> LockSet<'_> {
        self.lock(Held::BLOCKS)
    }

    pub fn lock_caches(&self) -> LockSet<'_> {
        self.lock(Held::CACHES)
    }

    /// Coarse mode: every arena lock, for batch operations.
    pub fn lock_all(&self) -> LockSet<'_> {
        self.lock(Held::ALL)
    }

    // ── Read access ───────────────────────────────────────────────────────

    #[inline]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    #[inline]
    pub(crate) fn host(&self) -> &dyn HostRegistry {
        self.host.as_ref()
    }

    #[inline]
    pub fn nests(&self) -> &[Nest] {
        &self.nests
    }

    pub fn grid(&self) -> RwLockReadGuard<'_, ArenaGrid> {
        read(&self.grid, "grid")
    }

    pub fn blocks(&self) -> RwLockReadGuard<'_, BlockStore> {
        read(&self.blocks, "block store")
    }

    pub fn caches(&self) -> RwLockReadGuard<'_, CacheStore> {
        read(&self.caches, "cache store")
    }

    /// IDs of blocks lying on the grid.
    pub fn free_blocks(&self) -> Vec<BlockId> {
        self.blocks().free_blocks()
    }

    /// Snapshot of caches removed during the current tick.
    pub fn zombie_caches(&self) -> Vec<Cache> {
        self.caches().zombies().to_vec()
    }

    pub fn robot_on_block(&self, pos: Vec2d, acquired: Option<EntityId>) -> Option<BlockId> {
        self.blocks().robot_on_block(pos, acquired)
    }

    pub fn robot_on_cache(&self, pos: Vec2d) -> Option<CacheId> {
        self.caches().robot_on_cache(pos)
    }

    /// The nest whose real extent contains `pos`.
    pub fn nest_at(&self, pos: Vec2d) -> Option<NestId> {
        self.nests.iter().find(|n| n.contains_point(pos)).map(Nest::id)
    }

    /// Would dropping `block` with its anchor at `at` collide with anything
    /// or leave the grid?
    pub fn placement_conflict(&self, block: BlockId, at: Vec2z) -> bool {
        let blocks = self.blocks();
        let grid = self.grid();
        let fp = blocks.block(block).footprint_at(at.to_real(self.resolution), self.resolution);
        !footprint_fits(&grid, &fp)
    }

    // ── Distribution ──────────────────────────────────────────────────────

    /// Place every out-of-sight block, then turn the remaining UNKNOWN cells
    /// EMPTY.  Returns the number of blocks placed.
    ///
    /// The batch uses the configured success policy; any distribution
    /// error is fatal.
    pub fn distribute_all_blocks(&self) -> usize {
        let mut locks = self.lock_all();
        let (caches, blocks, grid) = locks.all_mut();
        let mut avoid = avoid_list(&self.nests, caches, blocks, None);
        let total = blocks.len();

        let mut dispatcher = lock(&self.dispatcher, "dispatcher");
        let mut rng = lock(&self.rng, "arena rng");
        let mut pending: Vec<&mut Block> = blocks
            .iter_mut()
            .filter(|b| b.placement() == BlockPlacement::OutOfSight)
            .collect();
        let attempted = pending.len();
        let mut ctx = DistContext { grid: &mut *grid, rng: &mut *rng, avoid: &mut avoid };
        let placed = match dispatcher.distribute_blocks(&mut pending, &mut ctx, self.strict_dist) {
            Ok(n) => n,
            Err(e) => invariant_failed!("initial distribution of {attempted} blocks failed: {e}"),
        };
        drop(pending);
        let emptied = grid.empty_unknown_cells();
        info!(placed, attempted, total, emptied, "blocks distributed");
        placed
    }

    /// Redistribute one out-of-sight block.
    ///
    /// Needs all three locks; a caller may pre-hold caches, or caches and
    /// blocks.  Failure to place the block is fatal.
    pub fn distribute_single_block<'a>(&'a self, id: BlockId, mut locks: LockSet<'a>) -> LockSet<'a> {
        let acquired = locks.acquire(self, Held::ALL);
        {
            let (caches, blocks, grid) = locks.all_mut();
            let mut avoid = avoid_list(&self.nests, caches, blocks, Some(id));
            let block = blocks.block_mut(id);
            invariant!(
                block.placement() == BlockPlacement::OutOfSight,
                "{id} is {:?}, expected out of sight before redistribution",
                block.placement()
            );
            let mut dispatcher = lock(&self.dispatcher, "dispatcher");
            let mut rng = lock(&self.rng, "arena rng");
            let mut ctx = DistContext { grid, rng: &mut *rng, avoid: &mut avoid };
            if let Err(e) = dispatcher.distribute_block(block, &mut ctx) {
                invariant_failed!("could not redistribute {id}: {e}");
            }
        }
        locks.release(acquired);
        locks
    }

    /// Put an out-of-sight block on the grid with its anchor at `at`.
    ///
    /// For hosts that seed a known layout instead of distributing.
    pub fn place_block_at(&self, id: BlockId, at: Vec2z) -> ArenaResult<()> {
        let mut locks = self.lock(Held::BLOCKS_GRID);
        let (blocks, grid) = locks.blocks_grid_mut();
        let block = blocks.block_mut(id);
        if block.placement() != BlockPlacement::OutOfSight {
            return Err(ArenaError::AlreadyPlaced(id));
        }
        if !self.drop_at(block, at, grid) {
            return Err(ArenaError::PlacementConflict { block: id, at });
        }
        Ok(())
    }

    // ── Free block pickup and drop ────────────────────────────────────────

    /// Take a free block off the grid into `actor`'s hands.
    ///
    /// Clears the extent and anchor with blocks and grid held, releases the
    /// grid (if taken here), then updates the block and cluster bookkeeping.
    /// The block must be free.
    pub fn free_block_pickup<'a>(
        &'a self,
        id: BlockId,
        actor: ActorId,
        t: Tick,
        mut locks: LockSet<'a>,
    ) -> LockSet<'a> {
        let acquired = locks.acquire(self, Held::BLOCKS_GRID);
        let anchor = {
            let (blocks, grid) = locks.blocks_grid_mut();
            let block = blocks.block(id);
            let Some(fp) = block.footprint().copied() else {
                invariant_failed!("{id} is {:?}, cannot be picked up", block.placement());
            };
            grid.verify_entity(block);
            grid.clear_extent(block);
            grid.mark_empty(fp.anchor);
            fp.anchor
        };
        locks.release(acquired.minus(Held::BLOCKS));

        locks.blocks_mut().block_mut(id).pick_up(actor, t);
        lock(&self.dispatcher, "dispatcher").update_after_pickup(id, anchor);
        debug!(block = %id, %actor, %anchor, tick = %t, "free block picked up");

        locks.release(acquired);
        locks
    }

    /// Mark `block` on the grid with its anchor at `at` if the footprint
    /// fits.  Returns `false`, touching nothing, if it does not.
    pub(crate) fn drop_at(&self, block: &mut Block, at: Vec2z, grid: &mut ArenaGrid) -> bool {
        let fp = block.footprint_at(at.to_real(self.resolution), self.resolution);
        if !footprint_fits(grid, &fp) {
            return false;
        }
        block.place(fp);
        grid.set_block_extent(block);
        self.block_placed(block, at, grid);
        true
    }

    /// Check a block just marked on the grid at `at` and record it with the
    /// cluster whose region holds that anchor.
    pub(crate) fn block_placed(&self, block: &Block, at: Vec2z, grid: &ArenaGrid) {
        grid.verify_entity(block);
        lock(&self.dispatcher, "dispatcher").update_after_drop(block, at);
    }

    // ── Caches ────────────────────────────────────────────────────────────

    /// Create caches from `specs`.
    ///
    /// Constituent blocks that are still free are taken off the grid first.
    /// Blocks carried by a robot or already cached cannot join a cache.
    pub fn caches_add<'a>(
        &'a self,
        specs: Vec<CacheSpec>,
        t: Tick,
        mut locks: LockSet<'a>,
    ) -> (LockSet<'a>, Vec<CacheId>) {
        let acquired = locks.acquire(self, Held::ALL);
        let mut ids = Vec::with_capacity(specs.len());
        {
            let (caches, blocks, grid) = locks.all_mut();
            for spec in specs {
                for &b in &spec.blocks {
                    let block = blocks.block(b);
                    match block.placement() {
                        BlockPlacement::Free(fp) => {
                            grid.clear_extent(block);
                            grid.mark_empty(fp.anchor);
                            lock(&self.dispatcher, "dispatcher").update_after_pickup(b, fp.anchor);
                        }
                        BlockPlacement::OutOfSight => {}
                        other => invariant_failed!("{b} is {other:?}, cannot join a cache"),
                    }
                }
                let members = spec.blocks.clone();
                let id = caches.add(spec, grid, t, self.host.as_ref());
                for b in members {
                    blocks.block_mut(b).enter_cache(id);
                }
                ids.push(id);
            }
        }
        locks.release(acquired);
        (locks, ids)
    }

    /// Remove an active cache outright.  Its anchor is emptied and any
    /// blocks still in it are redistributed.
    pub fn cache_remove<'a>(&'a self, id: CacheId, mut locks: LockSet<'a>) -> LockSet<'a> {
        let acquired = locks.acquire(self, Held::ALL);
        let members = {
            let (caches, blocks, grid) = locks.all_mut();
            let Some(cache) = caches.get(id) else {
                invariant_failed!("{id} is not an active cache");
            };
            let members = cache.blocks().to_vec();
            grid.mark_empty(cache.extent().anchor);
            caches.remove(id, grid, self.host.as_ref());
            for &b in &members {
                blocks.block_mut(b).hide();
            }
            members
        };
        for b in members {
            locks = self.distribute_single_block(b, locks);
        }
        locks.release(acquired);
        locks
    }

    // ── Per tick ──────────────────────────────────────────────────────────

    /// Start-of-tick housekeeping: forget the previous tick's zombie caches.
    pub fn update(&self, t: Tick) {
        let mut locks = self.lock_caches();
        let n = locks.caches_mut().zombie_caches_clear();
        if n > 0 {
            debug!(tick = %t, n, "zombie caches cleared");
        }
    }

    /// Check every entity against the grid and every grid cell against its
    /// entity.  Panics on the first disagreement.
    pub fn verify_all(&self) {
        let mut locks = self.lock_all();
        let (caches, blocks, grid) = locks.all_mut();
        grid.verify_cells();
        for nest in &self.nests {
            grid.verify_entity(nest);
        }
        for block in blocks.iter().filter(|b| b.is_free()) {
            grid.verify_entity(block);
        }
        for cache in caches.iter() {
            grid.verify_entity(cache);
        }
        for (c, cell) in grid.cells() {
            let owner_ok = match cell.entity() {
                None => true,
                Some(EntityRef::Block(b)) => blocks.block(b).contains_cell(c),
                Some(EntityRef::Cache(k)) => caches.by_key(k).is_some_and(|x| x.contains_cell(c)),
                Some(EntityRef::Nest(n)) => self
                    .nests
                    .get(n.index())
                    .is_some_and(|x| x.contains_cell(c)),
            };
            invariant!(
                owner_ok,
                "cell@{c} in {} references {:?} which does not cover it",
                cell.state(),
                cell.entity()
            );
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Every in-sight footprint a placement must avoid, except block `skip`.
fn avoid_list(nests: &[Nest], caches: &CacheStore, blocks: &BlockStore, skip: Option<BlockId>) -> Vec<RealRect> {
    let mut avoid: Vec<RealRect> = blocks
        .iter()
        .filter(|b| Some(b.id()) != skip)
        .filter_map(|b| b.footprint().map(|f| f.rect))
        .collect();
    avoid.extend(nests.iter().map(|n| n.extent().rect));
    avoid.extend(caches.rects());
    avoid
}

/// Every cell of `fp` is inside the grid and claimable.
fn footprint_fits(grid: &ArenaGrid, fp: &Footprint) -> bool {
    fp.xdspan.ub < grid.xdsize()
        && fp.ydspan.ub < grid.ydsize()
        && fp.cells().all(|c| grid.state(c).is_claimable())
}
