//! `ArenaGrid` — the authoritative occupancy grid.
//!
//! # Transitions
//!
//! ```text
//!   UNKNOWN ─┐                 ┌─► HAS_BLOCK / HAS_CACHE         (anchor cells)
//!            ├── mark_* ───────┤
//!   EMPTY  ──┘                 └─► BLOCK_ / CACHE_ / NEST_EXTENT (other cells)
//!
//!   any state ── mark_empty ──► EMPTY
//! ```
//!
//! Claiming a cell that is not EMPTY or UNKNOWN is an invariant violation:
//! it means two entities believe they own the same coordinate.

use swarm_core::{BlockId, CacheKey, EntityRef, GridConfig, NestId, Vec2z, invariant, invariant_failed};
use swarm_repr::{Block, Cache, Nest, SpatialEntity};
use tracing::debug;

use crate::cell::{Cell, CellState};
use crate::error::{GridError, GridResult};
use crate::view::GridView;

pub struct ArenaGrid {
    xdsize: usize,
    ydsize: usize,
    resolution: f64,
    cells: Vec<Cell>,
}

impl ArenaGrid {
    /// A grid of `xdsize × ydsize` cells, all UNKNOWN.
    pub fn new(xdsize: usize, ydsize: usize, resolution: f64) -> Self {
        Self {
            xdsize,
            ydsize,
            resolution,
            cells: vec![Cell::default(); xdsize * ydsize],
        }
    }

    pub fn from_config(cfg: &GridConfig) -> Self {
        Self::new(cfg.xdsize(), cfg.ydsize(), cfg.resolution)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn xdsize(&self) -> usize {
        self.xdsize
    }

    #[inline]
    pub fn ydsize(&self) -> usize {
        self.ydsize
    }

    #[inline]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    #[inline]
    pub fn in_bounds(&self, c: Vec2z) -> bool {
        c.x < self.xdsize && c.y < self.ydsize
    }

    pub fn get(&self, c: Vec2z) -> GridResult<&Cell> {
        if !self.in_bounds(c) {
            return Err(GridError::OutOfBounds {
                coord: c,
                xdsize: self.xdsize,
                ydsize: self.ydsize,
            });
        }
        Ok(&self.cells[self.idx(c)])
    }

    /// The cell at `c`.  Out-of-bounds access is an invariant violation.
    #[inline]
    pub fn cell(&self, c: Vec2z) -> &Cell {
        &self.cells[self.checked_idx(c)]
    }

    #[inline]
    pub fn state(&self, c: Vec2z) -> CellState {
        self.cell(c).state()
    }

    /// All cells with their coordinates, row-major from the origin.
    pub fn cells(&self) -> impl Iterator<Item = (Vec2z, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, cell)| (Vec2z::new(i % self.xdsize, i / self.xdsize), cell))
    }

    /// The whole grid as a view.
    pub fn view(&self) -> GridView {
        GridView {
            origin: Vec2z::new(0, 0),
            shape: Vec2z::new(self.xdsize, self.ydsize),
        }
    }

    /// A validated rectangular sub-view.
    pub fn subview(&self, origin: Vec2z, shape: Vec2z) -> GridResult<GridView> {
        if shape.x == 0
            || shape.y == 0
            || origin.x + shape.x > self.xdsize
            || origin.y + shape.y > self.ydsize
        {
            return Err(GridError::BadView { origin, shape });
        }
        Ok(GridView { origin, shape })
    }

    /// Blocks whose anchor cell lies inside `view`.
    pub fn blocks_in(&self, view: &GridView) -> Vec<BlockId> {
        view.cells()
            .filter_map(|c| {
                let cell = self.cell(c);
                match (cell.state(), cell.entity()) {
                    (CellState::HasBlock, Some(EntityRef::Block(id))) => Some(id),
                    _ => None,
                }
            })
            .collect()
    }

    // ── Single-cell transitions ───────────────────────────────────────────

    /// Force a cell EMPTY regardless of its prior state.
    pub fn mark_empty(&mut self, c: Vec2z) {
        let i = self.checked_idx(c);
        self.cells[i].set(CellState::Empty, None);
    }

    pub fn mark_has_block(&mut self, c: Vec2z, id: BlockId) {
        self.claim(c, CellState::HasBlock, EntityRef::Block(id));
    }

    pub fn mark_has_cache(&mut self, c: Vec2z, key: CacheKey) {
        self.claim(c, CellState::HasCache, EntityRef::Cache(key));
    }

    pub fn mark_block_extent(&mut self, c: Vec2z, id: BlockId) {
        self.claim(c, CellState::BlockExtent, EntityRef::Block(id));
    }

    pub fn mark_cache_extent(&mut self, c: Vec2z, key: CacheKey) {
        self.claim(c, CellState::CacheExtent, EntityRef::Cache(key));
    }

    pub fn mark_nest_extent(&mut self, c: Vec2z, id: NestId) {
        self.claim(c, CellState::NestExtent, EntityRef::Nest(id));
    }

    /// Turn a HAS_CACHE anchor into HAS_BLOCK for the cache's last block.
    /// Only valid on a cache anchor.
    pub fn convert_cache_to_block(&mut self, c: Vec2z, id: BlockId) {
        let i = self.checked_idx(c);
        let prev = self.cells[i].state();
        invariant!(
            prev == CellState::HasCache,
            "cell@{c} in {prev}, expected HAS_CACHE before handing over to {id}"
        );
        self.cells[i].set(CellState::HasBlock, Some(EntityRef::Block(id)));
    }

    // ── Extent operations ─────────────────────────────────────────────────

    /// Mark a free block: anchor HAS_BLOCK, remaining cells BLOCK_EXTENT.
    pub fn set_block_extent(&mut self, block: &Block) {
        let Some(f) = block.footprint() else {
            invariant_failed!("{} is out of sight, cannot mark its extent", block.id());
        };
        self.mark_has_block(f.anchor, block.id());
        for c in f.extent_cells() {
            self.mark_block_extent(c, block.id());
        }
    }

    /// Mark a cache: anchor HAS_CACHE, remaining cells CACHE_EXTENT.
    pub fn set_cache_extent(&mut self, cache: &Cache) {
        let f = cache.extent();
        self.mark_has_cache(f.anchor, cache.key());
        for c in f.extent_cells() {
            self.mark_cache_extent(c, cache.key());
        }
    }

    /// Mark a nest: every cell NEST_EXTENT, including its anchor.
    pub fn set_nest_extent(&mut self, nest: &Nest) {
        for c in nest.extent().cells() {
            self.mark_nest_extent(c, nest.id());
        }
    }

    /// Every footprint cell except the anchor goes from the entity's extent
    /// state to EMPTY.  The anchor is the caller's to handle.
    pub fn clear_extent<E: SpatialEntity>(&mut self, entity: &E) {
        let Some(f) = entity.footprint() else {
            invariant_failed!("{} is out of sight, no extent to clear", entity.entity_id());
        };
        let expected = extent_state(entity.entity_ref());
        for c in f.extent_cells() {
            let cell = *self.cell(c);
            invariant!(
                cell.state() == expected && cell.entity() == Some(entity.entity_ref()),
                "cell@{c} in {} referencing {:?}, expected {expected} of {}",
                cell.state(),
                cell.entity(),
                entity.entity_id()
            );
            self.mark_empty(c);
        }
    }

    /// Panic if any footprint cell disagrees with `entity`.
    pub fn verify_entity<E: SpatialEntity>(&self, entity: &E) {
        let Some(f) = entity.footprint() else {
            invariant_failed!("{} is out of sight, nothing to verify", entity.entity_id());
        };
        let r = entity.entity_ref();
        for c in f.cells() {
            let cell = self.cell(c);
            let expected = if c == f.anchor { anchor_state(r) } else { extent_state(r) };
            invariant!(
                cell.state() == expected && cell.entity() == Some(r),
                "cell@{c} in {} referencing {:?} disagrees with {} (expected {expected})",
                cell.state(),
                cell.entity(),
                entity.entity_id()
            );
        }
    }

    /// Panic if any cell breaks the state/entity pairing rule: EMPTY and
    /// UNKNOWN cells hold nothing, every other state holds an entity of the
    /// matching kind.
    pub fn verify_cells(&self) {
        for (c, cell) in self.cells() {
            let ok = match (cell.state(), cell.entity()) {
                (CellState::Unknown | CellState::Empty, None) => true,
                (CellState::HasBlock | CellState::BlockExtent, Some(EntityRef::Block(_))) => true,
                (CellState::HasCache | CellState::CacheExtent, Some(EntityRef::Cache(_))) => true,
                (CellState::NestExtent, Some(EntityRef::Nest(_))) => true,
                _ => false,
            };
            invariant!(ok, "cell@{c} in {} holds {:?}", cell.state(), cell.entity());
        }
    }

    /// After initial distribution every still-UNKNOWN cell becomes EMPTY.
    /// Returns how many cells changed.
    pub fn empty_unknown_cells(&mut self) -> usize {
        let mut n = 0;
        for cell in &mut self.cells {
            if cell.state() == CellState::Unknown {
                cell.set(CellState::Empty, None);
                n += 1;
            }
        }
        debug!(n, "unknown cells emptied");
        n
    }

    // ── Internals ─────────────────────────────────────────────────────────

    #[inline]
    fn idx(&self, c: Vec2z) -> usize {
        c.y * self.xdsize + c.x
    }

    #[inline]
    fn checked_idx(&self, c: Vec2z) -> usize {
        invariant!(
            self.in_bounds(c),
            "cell@{c} outside {}x{} grid",
            self.xdsize,
            self.ydsize
        );
        self.idx(c)
    }

    fn claim(&mut self, c: Vec2z, state: CellState, entity: EntityRef) {
        let i = self.checked_idx(c);
        let prev = self.cells[i];
        invariant!(
            prev.state().is_claimable(),
            "cell@{c} in {} held by {:?}, cannot become {state} for {entity}",
            prev.state(),
            prev.entity()
        );
        self.cells[i].set(state, Some(entity));
    }
}

fn anchor_state(r: EntityRef) -> CellState {
    match r {
        EntityRef::Block(_) => CellState::HasBlock,
        EntityRef::Cache(_) => CellState::HasCache,
        EntityRef::Nest(_) => CellState::NestExtent,
    }
}

fn extent_state(r: EntityRef) -> CellState {
    match r {
        EntityRef::Block(_) => CellState::BlockExtent,
        EntityRef::Cache(_) => CellState::CacheExtent,
        EntityRef::Nest(_) => CellState::NestExtent,
    }
}
