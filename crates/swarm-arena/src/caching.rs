//! Cache lifecycle: active caches, zombies, dense ID recycling, and the
//! R-tree over cache extents.
//!
//! # Lifecycle
//!
//! ```text
//!   add ──► active ──remove──► zombie ──zombie_caches_clear──► gone (ID free)
//! ```
//!
//! A zombie keeps its `CacheId` until the next clear so metrics gathered in
//! the tick it was removed can still resolve it.  Its `CacheKey` goes stale
//! immediately, so no grid cell can resolve to it.
//!
//! Every mutating method takes `&mut self`: holding the cache store's write
//! guard is the precondition.

use std::collections::BTreeSet;

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use slotmap::SlotMap;
use swarm_core::{BlockId, CacheId, CacheKey, RealRect, Tick, Vec2d, invariant, invariant_failed};
use swarm_grid::{ArenaGrid, CellState};
use swarm_repr::{CACHE_MIN_BLOCKS, Cache, SpatialEntity};
use tracing::debug;

use crate::host::HostRegistry;

// ── IdPool ────────────────────────────────────────────────────────────────────

/// Dense ID allocator.  Released IDs are reused smallest-first.
#[derive(Clone, Debug, Default)]
pub struct IdPool {
    free: BTreeSet<u32>,
    next: u32,
}

impl IdPool {
    pub fn alloc(&mut self) -> u32 {
        if let Some(id) = self.free.pop_first() {
            return id;
        }
        let id = self.next;
        self.next += 1;
        id
    }

    pub fn release(&mut self, id: u32) {
        invariant!(id < self.next, "releasing id {id} never allocated");
        let fresh = self.free.insert(id);
        invariant!(fresh, "id {id} released twice");
    }

    /// Number of IDs currently handed out.
    pub fn in_use(&self) -> usize {
        self.next as usize - self.free.len()
    }
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// A cache extent in the spatial index.
#[derive(Clone, Debug, PartialEq)]
struct CacheEntry {
    lower: [f64; 2],
    upper: [f64; 2],
    id: CacheId,
}

impl CacheEntry {
    fn new(cache: &Cache) -> Self {
        let r = cache.extent().rect;
        Self {
            lower: [r.x.lb, r.y.lb],
            upper: [r.x.ub, r.y.ub],
            id: cache.id(),
        }
    }
}

impl RTreeObject for CacheEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.lower, self.upper)
    }
}

impl PointDistance for CacheEntry {
    /// Squared distance to the rectangle; 0 inside it.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.envelope().distance_2(point)
    }
}

// ── CacheSpec ─────────────────────────────────────────────────────────────────

/// What application-level cache policy asks the arena to create.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheSpec {
    pub center: Vec2d,
    pub dims: Vec2d,
    /// Constituent blocks, each free on the grid or out of sight.
    /// `ArenaMap::caches_add` takes free ones off the grid itself.
    pub blocks: Vec<BlockId>,
}

// ── CacheStore ────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct CacheStore {
    active: SlotMap<CacheKey, Cache>,
    /// `CacheId` → key of the active cache holding it.
    keys: Vec<Option<CacheKey>>,
    zombies: Vec<Cache>,
    index: RTree<CacheEntry>,
    ids: IdPool,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Active caches, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Cache> {
        self.active.values()
    }

    /// Caches removed during the current tick.
    #[inline]
    pub fn zombies(&self) -> &[Cache] {
        &self.zombies
    }

    pub fn key_of(&self, id: CacheId) -> Option<CacheKey> {
        self.keys.get(id.index()).copied().flatten()
    }

    pub fn get(&self, id: CacheId) -> Option<&Cache> {
        self.key_of(id).and_then(|k| self.active.get(k))
    }

    pub fn get_mut(&mut self, id: CacheId) -> Option<&mut Cache> {
        let key = self.key_of(id)?;
        self.active.get_mut(key)
    }

    /// Resolve a grid cell's cache reference.  `None` once the cache has
    /// been removed, even if its slot was reused.
    #[inline]
    pub fn by_key(&self, key: CacheKey) -> Option<&Cache> {
        self.active.get(key)
    }

    /// Which active cache, if any, covers `pos`?
    pub fn robot_on_cache(&self, pos: Vec2d) -> Option<CacheId> {
        self.index
            .locate_all_at_point(&[pos.x, pos.y])
            .next()
            .map(|e| e.id)
    }

    /// Real extents of every active cache.
    pub fn rects(&self) -> impl Iterator<Item = RealRect> + '_ {
        self.active.values().map(|c| c.extent().rect)
    }

    /// Create one cache and mark its extent.
    ///
    /// The constituent blocks must already be off the grid and the whole
    /// footprint must be EMPTY; the caller updates block placement.
    pub fn add(
        &mut self,
        spec: CacheSpec,
        grid: &mut ArenaGrid,
        t: Tick,
        host: &dyn HostRegistry,
    ) -> CacheId {
        invariant!(
            spec.blocks.len() >= CACHE_MIN_BLOCKS,
            "cache at {} needs at least {CACHE_MIN_BLOCKS} blocks, got {}",
            spec.center,
            spec.blocks.len()
        );
        let id = CacheId(self.ids.alloc());
        let res = grid.resolution();
        let key = self
            .active
            .insert_with_key(|key| Cache::new(id, key, spec.center, spec.dims, res, spec.blocks, t));
        let cache = &self.active[key];

        for c in cache.extent().cells() {
            invariant!(
                grid.in_bounds(c) && grid.state(c) == CellState::Empty,
                "{id} at {} overlaps cell@{c}",
                spec.center
            );
        }
        grid.set_cache_extent(cache);
        grid.verify_entity(cache);
        self.index.insert(CacheEntry::new(cache));
        host.register(cache.entity_ref());

        if self.keys.len() <= id.index() {
            self.keys.resize(id.index() + 1, None);
        }
        self.keys[id.index()] = Some(key);
        debug!(cache = %id, at = %cache.extent().anchor, n_blocks = cache.n_blocks(), "cache added");
        id
    }

    /// Remove an active cache: clear its extent (anchor excluded), drop it
    /// from the index, and keep it as a zombie until the next clear.
    ///
    /// The anchor must already have been handed over: it may not still
    /// reference this cache.
    pub fn remove(&mut self, id: CacheId, grid: &mut ArenaGrid, host: &dyn HostRegistry) {
        let Some(key) = self.key_of(id) else {
            invariant_failed!("{id} is not an active cache");
        };
        let Some(cache) = self.active.remove(key) else {
            invariant_failed!("{id} has a stale key");
        };
        self.keys[id.index()] = None;

        let anchor = cache.extent().anchor;
        invariant!(
            grid.cell(anchor).entity() != Some(cache.entity_ref()),
            "{id} anchor cell@{anchor} still in {}",
            grid.state(anchor)
        );
        grid.clear_extent(&cache);
        let removed = self.index.remove(&CacheEntry::new(&cache));
        invariant!(removed.is_some(), "{id} missing from the cache index");
        host.deregister(cache.entity_ref());

        debug!(cache = %id, "cache removed");
        self.zombies.push(cache);
    }

    /// Forget this tick's zombies and recycle their IDs.  Returns how many
    /// were cleared.
    pub fn zombie_caches_clear(&mut self) -> usize {
        let n = self.zombies.len();
        for z in self.zombies.drain(..) {
            self.ids.release(z.id().0);
        }
        n
    }
}
