//! Uniform-random placement over a grid view.

use swarm_core::config::DEFAULT_MAX_DIST_TRIES;
use swarm_core::geo::cells_for;
use swarm_core::{Vec2z, invariant};
use swarm_grid::GridView;
use swarm_repr::{Block, SpatialEntity};
use tracing::{debug, warn};

use crate::distributor::{BlockDistributor, DistContext};
use crate::error::{DistError, DistResult};

/// Samples anchor cells uniformly among those where the block's whole
/// footprint stays inside the view.
#[derive(Clone, Debug)]
pub struct RandomDistributor {
    view: GridView,
    max_tries: usize,
}

impl RandomDistributor {
    pub fn new(view: GridView) -> Self {
        Self { view, max_tries: DEFAULT_MAX_DIST_TRIES }
    }

    pub fn with_max_tries(mut self, max_tries: usize) -> Self {
        self.max_tries = max_tries.max(1);
        self
    }

    #[inline]
    pub fn view(&self) -> &GridView {
        &self.view
    }

    #[inline]
    pub fn max_tries(&self) -> usize {
        self.max_tries
    }
}

impl BlockDistributor for RandomDistributor {
    fn distribute_block(&mut self, block: &mut Block, ctx: &mut DistContext<'_>) -> DistResult<()> {
        let res = ctx.grid.resolution();
        let w = cells_for(block.rdims().x, res);
        let h = cells_for(block.rdims().y, res);
        if w > self.view.shape.x || h > self.view.shape.y {
            return Err(DistError::NoFit { block: block.id(), shape: self.view.shape });
        }
        let (xs, ys) = (self.view.xspan(), self.view.yspan());

        for attempt in 1..=self.max_tries {
            let danchor = Vec2z::new(
                ctx.rng.gen_range(xs.lb..=xs.ub + 1 - w),
                ctx.rng.gen_range(ys.lb..=ys.ub + 1 - h),
            );
            let footprint = block.footprint_at(danchor.to_real(res), res);
            if ctx.avoid.iter().any(|r| r.overlaps(&footprint.rect)) {
                continue;
            }
            if !footprint.cells().all(|c| ctx.grid.state(c).is_claimable()) {
                continue;
            }
            invariant!(
                footprint.anchor == danchor,
                "{} sampled at {danchor} but anchors at {}",
                block.id(),
                footprint.anchor
            );
            block.place(footprint);
            ctx.grid.set_block_extent(block);
            ctx.grid.verify_entity(block);
            ctx.avoid.push(footprint.rect);
            debug!(block = %block.id(), at = %danchor, attempt, "block distributed");
            return Ok(());
        }

        warn!(block = %block.id(), tries = self.max_tries, "block distribution retries exhausted");
        Err(DistError::RetriesExhausted { block: block.id(), tries: self.max_tries })
    }
}
