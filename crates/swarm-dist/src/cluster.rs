//! Capacity-bounded placement into a fixed source region.

use swarm_core::{BlockId, ClusterId, Vec2z, invariant, invariant_failed};
use swarm_grid::{ArenaGrid, GridView};
use swarm_repr::{Block, SpatialEntity};
use tracing::debug;

use crate::distributor::{BlockDistributor, DistContext};
use crate::error::{DistError, DistResult};
use crate::random::RandomDistributor;

/// A source region and the blocks currently lying in it.
#[derive(Clone, Debug)]
pub struct BlockCluster {
    id: ClusterId,
    view: GridView,
    capacity: usize,
    blocks: Vec<BlockId>,
}

impl BlockCluster {
    pub fn new(id: ClusterId, view: GridView, capacity: usize) -> Self {
        Self { id, view, capacity, blocks: Vec::new() }
    }

    #[inline]
    pub fn id(&self) -> ClusterId {
        self.id
    }

    #[inline]
    pub fn view(&self) -> &GridView {
        &self.view
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
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
    pub fn is_full(&self) -> bool {
        self.blocks.len() >= self.capacity
    }

    /// `true` if the anchor cell `c` lies in this cluster's region.
    #[inline]
    pub fn contains_cell(&self, c: Vec2z) -> bool {
        self.view.contains(c)
    }

    /// A member block was picked up.  It must be a member.
    pub fn update_after_pickup(&mut self, id: BlockId) {
        let Some(pos) = self.blocks.iter().position(|b| *b == id) else {
            invariant_failed!("{id} picked up from {} but not a member", self.id);
        };
        self.blocks.remove(pos);
        debug!(cluster = %self.id, block = %id, n = self.blocks.len(), "cluster after pickup");
    }

    /// A block was placed inside this cluster's region.
    pub fn update_after_drop(&mut self, block: &Block) {
        let Some(anchor) = block.danchor() else {
            invariant_failed!("{} dropped into {} while out of sight", block.id(), self.id);
        };
        invariant!(
            self.view.contains(anchor),
            "{} anchored at {anchor} outside {}",
            block.id(),
            self.id
        );
        invariant!(
            !self.blocks.contains(&block.id()),
            "{} already a member of {}",
            block.id(),
            self.id
        );
        self.blocks.push(block.id());
    }

    /// Rebuild membership from the blocks anchored in the region.
    pub fn blocks_recalc(&mut self, grid: &ArenaGrid) {
        self.blocks = grid.blocks_in(&self.view);
    }
}

/// Random placement restricted to one cluster, refusing once it is full.
#[derive(Clone, Debug)]
pub struct ClusterDistributor {
    cluster: BlockCluster,
    inner: RandomDistributor,
}

impl ClusterDistributor {
    pub fn new(cluster: BlockCluster, max_tries: usize) -> Self {
        let inner = RandomDistributor::new(cluster.view).with_max_tries(max_tries);
        Self { cluster, inner }
    }

    #[inline]
    pub fn cluster(&self) -> &BlockCluster {
        &self.cluster
    }
}

impl BlockDistributor for ClusterDistributor {
    fn distribute_block(&mut self, block: &mut Block, ctx: &mut DistContext<'_>) -> DistResult<()> {
        if self.cluster.is_full() {
            return Err(DistError::CapacityReached {
                cluster: self.cluster.id,
                capacity: self.cluster.capacity,
            });
        }
        self.inner.distribute_block(block, ctx)?;
        self.cluster.update_after_drop(block);
        Ok(())
    }

    fn block_clusters(&self) -> Vec<&BlockCluster> {
        vec![&self.cluster]
    }

    fn block_clusters_mut(&mut self) -> Vec<&mut BlockCluster> {
        vec![&mut self.cluster]
    }
}
