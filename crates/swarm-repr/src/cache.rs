//! Caches: multi-cell piles of blocks created and destroyed by arena policy.

use swarm_core::{BlockId, CacheId, CacheKey, EntityId, EntityRef, Tick, Vec2d};

use crate::entity::{Footprint, SpatialEntity};

/// A pile with fewer blocks than this is no longer a cache.
pub const CACHE_MIN_BLOCKS: usize = 2;

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cache {
    id: CacheId,
    key: CacheKey,
    rdims: Vec2d,
    footprint: Footprint,
    blocks: Vec<BlockId>,
    creation: Tick,
    n_pickups: u32,
    n_drops: u32,
}

impl Cache {
    pub fn new(
        id: CacheId,
        key: CacheKey,
        center: Vec2d,
        rdims: Vec2d,
        resolution: f64,
        blocks: Vec<BlockId>,
        creation: Tick,
    ) -> Self {
        Self {
            id,
            key,
            rdims,
            footprint: Footprint::centered(center, rdims, resolution),
            blocks,
            creation,
            n_pickups: 0,
            n_drops: 0,
        }
    }

    #[inline]
    pub fn id(&self) -> CacheId {
        self.id
    }

    #[inline]
    pub fn key(&self) -> CacheKey {
        self.key
    }

    #[inline]
    pub fn extent(&self) -> &Footprint {
        &self.footprint
    }

    #[inline]
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    #[inline]
    pub fn n_blocks(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn creation(&self) -> Tick {
        self.creation
    }

    pub fn n_pickups(&self) -> u32 {
        self.n_pickups
    }

    pub fn n_drops(&self) -> u32 {
        self.n_drops
    }

    #[inline]
    pub fn contains_block(&self, id: BlockId) -> bool {
        self.blocks.contains(&id)
    }

    /// Add a dropped block to the pile.
    pub fn block_add(&mut self, id: BlockId) {
        self.blocks.push(id);
        self.n_drops += 1;
    }

    /// Remove and return the most recently added block.
    pub fn block_take(&mut self) -> Option<BlockId> {
        let id = self.blocks.pop()?;
        self.n_pickups += 1;
        Some(id)
    }
}

impl SpatialEntity for Cache {
    #[inline]
    fn entity_ref(&self) -> EntityRef {
        EntityRef::Cache(self.key)
    }

    #[inline]
    fn entity_id(&self) -> EntityId {
        EntityId::Cache(self.id)
    }

    #[inline]
    fn footprint(&self) -> Option<&Footprint> {
        Some(&self.footprint)
    }

    #[inline]
    fn rdims(&self) -> Vec2d {
        self.rdims
    }
}
