//! The owning block collection.

use swarm_core::{BlockId, BlockManifest, EntityId, Vec2d, invariant};
use swarm_repr::{Block, BlockKind, SpatialEntity};

/// Every block in the arena, indexed by `BlockId`.  The set is fixed at
/// construction; blocks move in and out of sight but are never destroyed.
#[derive(Clone, Debug, Default)]
pub struct BlockStore {
    blocks: Vec<Block>,
}

impl BlockStore {
    /// Cubes take IDs `0..n_cube`, ramps follow.
    pub fn from_manifest(manifest: &BlockManifest) -> Self {
        let kinds = std::iter::repeat_n(BlockKind::Cube, manifest.n_cube)
            .chain(std::iter::repeat_n(BlockKind::Ramp, manifest.n_ramp));
        let blocks = kinds
            .enumerate()
            .map(|(i, kind)| Block::new(BlockId(i as u32), kind, manifest.unit_dim))
            .collect();
        Self { blocks }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.index())
    }

    /// The block with `id`.  Naming a block that does not exist is fatal.
    pub fn block(&self, id: BlockId) -> &Block {
        invariant!(id.index() < self.blocks.len(), "{id} does not exist");
        &self.blocks[id.index()]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        invariant!(id.index() < self.blocks.len(), "{id} does not exist");
        &mut self.blocks[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Block> {
        self.blocks.iter_mut()
    }

    /// Blocks currently lying on the grid.
    pub fn free_blocks(&self) -> Vec<BlockId> {
        self.blocks.iter().filter(|b| b.is_free()).map(Block::id).collect()
    }

    /// Which block, if any, lies under `pos`?
    ///
    /// Checks the actor's acquired block first, then scans every block.
    pub fn robot_on_block(&self, pos: Vec2d, acquired: Option<EntityId>) -> Option<BlockId> {
        if let Some(b) = acquired.and_then(EntityId::block).and_then(|id| self.get(id)) {
            if b.contains_point(pos) {
                return Some(b.id());
            }
        }
        self.blocks.iter().find(|b| b.contains_point(pos)).map(Block::id)
    }
}
