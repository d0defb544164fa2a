//! Blocks: the single-footprint, movable objects robots forage for.

use swarm_core::{ActorId, BlockId, CacheId, EntityId, EntityRef, Tick, Vec2d};

use crate::entity::{Footprint, SpatialEntity};

/// Block shape.  A cube covers one unit square, a ramp two units along x.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockKind {
    Cube,
    Ramp,
}

impl BlockKind {
    pub fn rdims(self, unit_dim: f64) -> Vec2d {
        match self {
            BlockKind::Cube => Vec2d::new(unit_dim, unit_dim),
            BlockKind::Ramp => Vec2d::new(2.0 * unit_dim, unit_dim),
        }
    }
}

/// Where a block currently is.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlockPlacement {
    /// Not yet distributed, or just dropped in a nest awaiting redistribution.
    OutOfSight,
    /// Lying on the grid.
    Free(Footprint),
    /// Held by a robot; absent from the grid.
    Carried { by: ActorId, since: Tick },
    /// Part of a cache; the cache owns the grid cells.
    InCache(CacheId),
}

/// Per-block foraging bookkeeping, reset on each nest drop.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockStats {
    /// Number of distinct pickups since the last nest drop.
    pub transporters: u32,
    pub first_pickup: Option<Tick>,
    pub last_carrier: Option<ActorId>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    id: BlockId,
    kind: BlockKind,
    rdims: Vec2d,
    placement: BlockPlacement,
    stats: BlockStats,
}

impl Block {
    /// A new, undistributed block.
    pub fn new(id: BlockId, kind: BlockKind, unit_dim: f64) -> Self {
        Self {
            id,
            kind,
            rdims: kind.rdims(unit_dim),
            placement: BlockPlacement::OutOfSight,
            stats: BlockStats::default(),
        }
    }

    #[inline]
    pub fn id(&self) -> BlockId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    #[inline]
    pub fn placement(&self) -> BlockPlacement {
        self.placement
    }

    #[inline]
    pub fn stats(&self) -> &BlockStats {
        &self.stats
    }

    /// Footprint this block would have with its lower-left corner at `ranchor`.
    pub fn footprint_at(&self, ranchor: Vec2d, resolution: f64) -> Footprint {
        Footprint::anchored(ranchor, self.rdims, resolution)
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        matches!(self.placement, BlockPlacement::Free(_))
    }

    pub fn carrier(&self) -> Option<ActorId> {
        match self.placement {
            BlockPlacement::Carried { by, .. } => Some(by),
            _ => None,
        }
    }

    pub fn cache(&self) -> Option<CacheId> {
        match self.placement {
            BlockPlacement::InCache(id) => Some(id),
            _ => None,
        }
    }

    /// Put the block on the grid.  Grid marking is the caller's job.
    pub fn place(&mut self, footprint: Footprint) {
        self.placement = BlockPlacement::Free(footprint);
    }

    /// A robot takes the block: it leaves the grid and its stats record the
    /// new carrier.
    pub fn pick_up(&mut self, by: ActorId, t: Tick) {
        self.placement = BlockPlacement::Carried { by, since: t };
        self.stats.transporters += 1;
        self.stats.first_pickup.get_or_insert(t);
        self.stats.last_carrier = Some(by);
    }

    /// The block becomes a constituent of `cache`.
    pub fn enter_cache(&mut self, cache: CacheId) {
        self.placement = BlockPlacement::InCache(cache);
    }

    /// Out of sight pending redistribution; stats are kept.
    pub fn hide(&mut self) {
        self.placement = BlockPlacement::OutOfSight;
    }

    /// Delivered to a nest: out of sight until redistributed, stats reset.
    pub fn nest_drop(&mut self) {
        self.placement = BlockPlacement::OutOfSight;
        self.stats = BlockStats::default();
    }
}

impl SpatialEntity for Block {
    #[inline]
    fn entity_ref(&self) -> EntityRef {
        EntityRef::Block(self.id)
    }

    #[inline]
    fn entity_id(&self) -> EntityId {
        EntityId::Block(self.id)
    }

    /// Only free blocks have a footprint; carried, cached, and undistributed
    /// blocks are out of sight.
    fn footprint(&self) -> Option<&Footprint> {
        match &self.placement {
            BlockPlacement::Free(f) => Some(f),
            _ => None,
        }
    }

    #[inline]
    fn rdims(&self) -> Vec2d {
        self.rdims
    }
}
