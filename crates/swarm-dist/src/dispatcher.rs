//! `Dispatcher` — the distributor set an arena is configured with.
//!
//! # Layouts
//!
//! | `DistType`     | Distributors                                          |
//! |----------------|-------------------------------------------------------|
//! | `Random`       | one `RandomDistributor` over the arena interior       |
//! | `SingleSource` | one cluster at the right end                          |
//! | `DualSource`   | clusters at the left and right ends                   |
//! | `QuadSource`   | clusters at the left, right, bottom and top ends      |
//!
//! The interior excludes a one-cell border so blocks never touch the arena
//! walls.  Source regions are bands `max(2, size / 5)` cells deep along the
//! relevant wall.  Left/right bands cover the middle half of their wall;
//! bottom/top bands span the x range between them, so no two regions share
//! a cell.

use swarm_core::{BlockDistConfig, BlockId, ClusterId, DistType, Vec2z, invariant};
use swarm_grid::{ArenaGrid, GridView};
use swarm_repr::Block;
use tracing::info;

use crate::cluster::{BlockCluster, ClusterDistributor};
use crate::distributor::{BlockDistributor, DistContext, run_batch};
use crate::error::{DistError, DistResult};
use crate::random::RandomDistributor;

pub struct Dispatcher {
    dist_type: DistType,
    distributors: Vec<Box<dyn BlockDistributor>>,
}

impl Dispatcher {
    /// Build the distributor set for `cfg` over `grid`.
    pub fn new(cfg: &BlockDistConfig, grid: &ArenaGrid) -> DistResult<Self> {
        let interior = interior(grid)?;
        let mut distributors: Vec<Box<dyn BlockDistributor>> = Vec::new();
        match cfg.dist_type {
            DistType::Random => {
                distributors.push(Box::new(
                    RandomDistributor::new(interior).with_max_tries(cfg.max_dist_tries),
                ));
            }
            kind => {
                for (i, view) in source_regions(kind, grid)?.into_iter().enumerate() {
                    let capacity = cfg.cluster_capacity.unwrap_or(view.n_cells());
                    let cluster = BlockCluster::new(ClusterId(i as u32), view, capacity);
                    distributors.push(Box::new(ClusterDistributor::new(cluster, cfg.max_dist_tries)));
                }
            }
        }
        info!(
            dist_type = ?cfg.dist_type,
            n_distributors = distributors.len(),
            "block distribution configured"
        );
        Ok(Self { dist_type: cfg.dist_type, distributors })
    }

    /// A dispatcher over an explicit distributor set.
    pub fn from_distributors(dist_type: DistType, distributors: Vec<Box<dyn BlockDistributor>>) -> Self {
        Self { dist_type, distributors }
    }

    #[inline]
    pub fn dist_type(&self) -> DistType {
        self.dist_type
    }

    #[inline]
    pub fn has_clusters(&self) -> bool {
        self.distributors.iter().any(|d| !d.block_clusters().is_empty())
    }

    /// Cluster bookkeeping after a free block left the grid from `anchor`.
    ///
    /// The cluster whose region contains the old anchor must list the block.
    /// A block picked up outside every region (dropped there by a robot)
    /// must not be listed anywhere.
    pub fn update_after_pickup(&mut self, id: BlockId, anchor: Vec2z) {
        let mut clusters = self.block_clusters_mut();
        match clusters.iter_mut().find(|c| c.contains_cell(anchor)) {
            Some(cluster) => cluster.update_after_pickup(id),
            None => invariant!(
                !clusters.iter().any(|c| c.blocks().contains(&id)),
                "{id} picked up at {anchor} outside every cluster but still listed by one"
            ),
        }
    }

    /// A block was dropped at a free location; record it with the cluster
    /// containing its anchor, if any.  Capacity bounds distribution only, so
    /// robot drops are recorded even into a full cluster.
    pub fn update_after_drop(&mut self, block: &Block, anchor: Vec2z) {
        if let Some(cluster) = self
            .block_clusters_mut()
            .into_iter()
            .find(|c| c.contains_cell(anchor))
        {
            cluster.update_after_drop(block);
        }
    }

    /// Rebuild every cluster's membership from the grid.
    pub fn clusters_recalc(&mut self, grid: &ArenaGrid) {
        for cluster in self.block_clusters_mut() {
            cluster.blocks_recalc(grid);
        }
    }

    /// Try distributors in `order` until one succeeds; the last failure is
    /// reported if none does.
    fn place_in_order<I>(&mut self, order: I, block: &mut Block, ctx: &mut DistContext<'_>) -> DistResult<()>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut last = DistError::NoDistributors;
        for i in order {
            match self.distributors[i].distribute_block(block, ctx) {
                Ok(()) => return Ok(()),
                Err(e) => last = e,
            }
        }
        Err(last)
    }
}

impl BlockDistributor for Dispatcher {
    /// Try distributors in shuffled order until one succeeds.
    fn distribute_block(&mut self, block: &mut Block, ctx: &mut DistContext<'_>) -> DistResult<()> {
        if self.distributors.is_empty() {
            return Err(DistError::NoDistributors);
        }
        let mut order: Vec<usize> = (0..self.distributors.len()).collect();
        ctx.rng.shuffle(&mut order);
        self.place_in_order(order, block, ctx)
    }

    /// Blocks are dealt round-robin: block `i` starts at distributor
    /// `i mod n` and falls through to the others in order.
    fn distribute_blocks(
        &mut self,
        blocks: &mut [&mut Block],
        ctx: &mut DistContext<'_>,
        strict: bool,
    ) -> DistResult<usize> {
        if self.distributors.is_empty() {
            return Err(DistError::NoDistributors);
        }
        let n = self.distributors.len();
        run_batch(blocks, strict, |i, b| self.place_in_order((0..n).map(|k| (i + k) % n), b, ctx))
    }

    fn block_clusters(&self) -> Vec<&BlockCluster> {
        self.distributors.iter().flat_map(|d| d.block_clusters()).collect()
    }

    fn block_clusters_mut(&mut self) -> Vec<&mut BlockCluster> {
        self.distributors
            .iter_mut()
            .flat_map(|d| d.block_clusters_mut())
            .collect()
    }
}

// ── Regions ───────────────────────────────────────────────────────────────────

fn interior(grid: &ArenaGrid) -> DistResult<GridView> {
    let (xd, yd) = (grid.xdsize(), grid.ydsize());
    if xd > 2 && yd > 2 {
        Ok(grid.subview(Vec2z::new(1, 1), Vec2z::new(xd - 2, yd - 2))?)
    } else {
        Ok(grid.view())
    }
}

fn source_regions(kind: DistType, grid: &ArenaGrid) -> DistResult<Vec<GridView>> {
    let (xd, yd) = (grid.xdsize(), grid.ydsize());
    let xband = (xd / 5).max(2);
    let yband = (yd / 5).max(2);
    let ymid = (yd / 2).max(1);
    let xinner = xd.saturating_sub(2 + 2 * xband);

    let right = || grid.subview(Vec2z::new(xd.saturating_sub(1 + xband), yd / 4), Vec2z::new(xband, ymid));
    let left = || grid.subview(Vec2z::new(1, yd / 4), Vec2z::new(xband, ymid));
    let bottom = || grid.subview(Vec2z::new(1 + xband, 1), Vec2z::new(xinner, yband));
    let top = || grid.subview(Vec2z::new(1 + xband, yd.saturating_sub(1 + yband)), Vec2z::new(xinner, yband));

    let views = match kind {
        DistType::Random => Vec::new(),
        DistType::SingleSource => vec![right()?],
        DistType::DualSource => vec![left()?, right()?],
        DistType::QuadSource => vec![left()?, right()?, bottom()?, top()?],
    };
    Ok(views)
}
