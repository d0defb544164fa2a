//! The strategy trait shared by every distributor.

use swarm_core::{ArenaRng, RealRect};
use swarm_grid::ArenaGrid;
use swarm_repr::Block;

use crate::cluster::BlockCluster;
use crate::error::{DistError, DistResult};

/// Everything a placement touches besides the block itself.
///
/// The grid borrow is the caller's write guard; distributors never lock.
pub struct DistContext<'a> {
    pub grid: &'a mut ArenaGrid,
    pub rng: &'a mut ArenaRng,
    /// Footprints no placement may overlap.  Grows with every success.
    pub avoid: &'a mut Vec<RealRect>,
}

/// A block placement strategy.
pub trait BlockDistributor: Send {
    /// Place one block.  On success the block is free, the grid carries its
    /// extent, and the avoid list holds its footprint.
    fn distribute_block(&mut self, block: &mut Block, ctx: &mut DistContext<'_>) -> DistResult<()>;

    /// Place a batch.
    ///
    /// - `strict`: stop at the first failure and return it.  Placements made
    ///   before the failure stay applied.
    /// - best-effort: try every block; succeed if at least one was placed.
    ///
    /// Returns the number of blocks placed.
    fn distribute_blocks(
        &mut self,
        blocks: &mut [&mut Block],
        ctx: &mut DistContext<'_>,
        strict: bool,
    ) -> DistResult<usize> {
        run_batch(blocks, strict, |_, b| self.distribute_block(b, ctx))
    }

    /// Clusters managed by this distributor, if any.
    fn block_clusters(&self) -> Vec<&BlockCluster> {
        Vec::new()
    }

    fn block_clusters_mut(&mut self) -> Vec<&mut BlockCluster> {
        Vec::new()
    }
}

/// Shared batch policy.  `place` receives the block's position in the batch.
pub(crate) fn run_batch<F>(blocks: &mut [&mut Block], strict: bool, mut place: F) -> DistResult<usize>
where
    F: FnMut(usize, &mut Block) -> DistResult<()>,
{
    let mut placed = 0;
    for (i, block) in blocks.iter_mut().enumerate() {
        match place(i, block) {
            Ok(()) => placed += 1,
            Err(e) if strict => return Err(e),
            Err(_) => {}
        }
    }
    if placed == 0 && !blocks.is_empty() {
        return Err(DistError::NoneDistributed { attempted: blocks.len() });
    }
    Ok(placed)
}
