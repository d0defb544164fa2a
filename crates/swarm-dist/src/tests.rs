//! Unit tests for swarm-dist.

/// Borrow a test fixture as a distribution context.
macro_rules! ctx {
    ($f:expr) => {
        &mut $crate::DistContext {
            grid: &mut $f.grid,
            rng: &mut $f.rng,
            avoid: &mut $f.avoid,
        }
    };
}

#[cfg(test)]
mod helpers {
    use swarm_core::{ArenaRng, BlockId, RealRect};
    use swarm_grid::ArenaGrid;
    use swarm_repr::{Block, BlockKind};

    pub const RES: f64 = 0.2;

    pub fn grid(n: usize) -> ArenaGrid {
        let mut g = ArenaGrid::new(n, n, RES);
        g.empty_unknown_cells();
        g
    }

    pub fn cubes(n: u32) -> Vec<Block> {
        (0..n).map(|i| Block::new(BlockId(i), BlockKind::Cube, RES)).collect()
    }

    pub struct Fixture {
        pub grid: ArenaGrid,
        pub rng: ArenaRng,
        pub avoid: Vec<RealRect>,
    }

    impl Fixture {
        pub fn new(n: usize) -> Self {
            Self { grid: grid(n), rng: ArenaRng::new(11), avoid: Vec::new() }
        }
    }
}

#[cfg(test)]
mod random {
    use swarm_core::{BlockId, RealRect, Vec2d, Vec2z};
    use swarm_grid::CellState;
    use swarm_repr::{Block, BlockKind, SpatialEntity};

    use super::helpers::{Fixture, RES, cubes};
    use crate::{BlockDistributor, DistError, RandomDistributor};

    #[test]
    fn places_and_marks_grid() {
        let mut f = Fixture::new(10);
        let mut d = RandomDistributor::new(f.grid.view());
        let mut b = Block::new(BlockId(0), BlockKind::Ramp, RES);
        d.distribute_block(&mut b, ctx!(f)).unwrap();

        let anchor = b.danchor().unwrap();
        assert_eq!(f.grid.state(anchor), CellState::HasBlock);
        assert_eq!(f.grid.state(Vec2z::new(anchor.x + 1, anchor.y)), CellState::BlockExtent);
        assert_eq!(f.avoid.len(), 1);
        f.grid.verify_entity(&b);
    }

    #[test]
    fn n_blocks_fit_without_overlap() {
        let mut f = Fixture::new(10);
        let mut d = RandomDistributor::new(f.grid.view());
        let mut blocks = cubes(30);
        let mut refs: Vec<&mut Block> = blocks.iter_mut().collect();
        let n = d.distribute_blocks(&mut refs, ctx!(f), true).unwrap();
        assert_eq!(n, 30);

        for (i, a) in blocks.iter().enumerate() {
            f.grid.verify_entity(a);
            for b in &blocks[i + 1..] {
                let (ra, rb) = (a.footprint().unwrap().rect, b.footprint().unwrap().rect);
                assert!(!ra.overlaps(&rb), "{} overlaps {}", a.id(), b.id());
            }
        }
        let n_has = f.grid.cells().filter(|(_, c)| c.state() == CellState::HasBlock).count();
        assert_eq!(n_has, 30);
    }

    #[test]
    fn avoid_list_is_respected() {
        let mut f = Fixture::new(4);
        // Everything but the top-right cell is off limits.
        f.avoid.push(RealRect::from_anchor(Vec2d::new(0.0, 0.0), Vec2d::new(0.8, 0.6)));
        f.avoid.push(RealRect::from_anchor(Vec2d::new(0.0, 0.6), Vec2d::new(0.6, 0.2)));
        let mut d = RandomDistributor::new(f.grid.view());
        let mut b = Block::new(BlockId(0), BlockKind::Cube, RES);
        d.distribute_block(&mut b, ctx!(f)).unwrap();
        assert_eq!(b.danchor(), Some(Vec2z::new(3, 3)));
    }

    #[test]
    fn exhaustion_is_reported() {
        let mut f = Fixture::new(4);
        f.avoid.push(RealRect::from_anchor(Vec2d::new(0.0, 0.0), Vec2d::new(0.8, 0.8)));
        let mut d = RandomDistributor::new(f.grid.view()).with_max_tries(25);
        let mut b = Block::new(BlockId(5), BlockKind::Cube, RES);
        let err = d.distribute_block(&mut b, ctx!(f)).unwrap_err();
        assert!(matches!(err, DistError::RetriesExhausted { block: BlockId(5), tries: 25 }));
        assert!(b.is_out_of_sight());
        assert!(f.grid.cells().all(|(_, c)| c.is_empty()));
    }

    #[test]
    fn ramp_does_not_fit_narrow_view() {
        let mut f = Fixture::new(4);
        let view = f.grid.subview(Vec2z::new(0, 0), Vec2z::new(1, 4)).unwrap();
        let mut d = RandomDistributor::new(view);
        let mut b = Block::new(BlockId(0), BlockKind::Ramp, RES);
        assert!(matches!(
            d.distribute_block(&mut b, ctx!(f)),
            Err(DistError::NoFit { .. })
        ));
    }

    #[test]
    fn strict_batch_stops_at_first_failure() {
        // 2×2 grid holds four cubes; the fifth cannot be placed.
        let mut f = Fixture::new(2);
        let mut d = RandomDistributor::new(f.grid.view()).with_max_tries(50);
        let mut blocks = cubes(6);
        let mut refs: Vec<&mut Block> = blocks.iter_mut().collect();
        let err = d.distribute_blocks(&mut refs, ctx!(f), true).unwrap_err();
        assert!(matches!(err, DistError::RetriesExhausted { block: BlockId(4), .. }));
        // Earlier placements stay applied; the sixth was never attempted.
        assert_eq!(blocks.iter().filter(|b| b.is_free()).count(), 4);
    }

    #[test]
    fn best_effort_batch_reports_partial_success() {
        let mut f = Fixture::new(2);
        let mut d = RandomDistributor::new(f.grid.view()).with_max_tries(50);
        let mut blocks = cubes(6);
        let mut refs: Vec<&mut Block> = blocks.iter_mut().collect();
        assert_eq!(d.distribute_blocks(&mut refs, ctx!(f), false).unwrap(), 4);
    }

    #[test]
    fn best_effort_batch_fails_when_nothing_placed() {
        let mut f = Fixture::new(2);
        f.avoid.push(RealRect::from_anchor(Vec2d::new(0.0, 0.0), Vec2d::new(0.4, 0.4)));
        let mut d = RandomDistributor::new(f.grid.view()).with_max_tries(5);
        let mut blocks = cubes(2);
        let mut refs: Vec<&mut Block> = blocks.iter_mut().collect();
        assert!(matches!(
            d.distribute_blocks(&mut refs, ctx!(f), false),
            Err(DistError::NoneDistributed { attempted: 2 })
        ));
    }
}

#[cfg(test)]
mod cluster {
    use swarm_core::{BlockId, ClusterId, Vec2z};
    use swarm_repr::{Block, BlockKind, SpatialEntity};

    use super::helpers::{Fixture, RES, cubes};
    use crate::{BlockCluster, BlockDistributor, ClusterDistributor, DistError};

    fn cluster(f: &Fixture, capacity: usize) -> BlockCluster {
        let view = f.grid.subview(Vec2z::new(2, 2), Vec2z::new(3, 3)).unwrap();
        BlockCluster::new(ClusterId(0), view, capacity)
    }

    #[test]
    fn places_inside_region() {
        let mut f = Fixture::new(10);
        let mut d = ClusterDistributor::new(cluster(&f, 9), 1000);
        let mut blocks = cubes(5);
        let mut refs: Vec<&mut Block> = blocks.iter_mut().collect();
        d.distribute_blocks(&mut refs, ctx!(f), true).unwrap();
        for b in &blocks {
            assert!(d.cluster().contains_cell(b.danchor().unwrap()));
        }
        assert_eq!(d.cluster().n_blocks(), 5);
    }

    #[test]
    fn saturated_cluster_refuses() {
        let mut f = Fixture::new(10);
        let mut d = ClusterDistributor::new(cluster(&f, 2), 1000);
        let mut blocks = cubes(3);
        let (placed, rest) = blocks.split_at_mut(2);
        for b in placed.iter_mut() {
            d.distribute_block(b, ctx!(f)).unwrap();
        }
        let avoid_before = f.avoid.len();
        let err = d.distribute_block(&mut rest[0], ctx!(f)).unwrap_err();
        assert!(matches!(err, DistError::CapacityReached { cluster: ClusterId(0), capacity: 2 }));
        // Refused without sampling: nothing changed.
        assert_eq!(f.avoid.len(), avoid_before);
        assert!(rest[0].is_out_of_sight());
    }

    #[test]
    fn pickup_then_recalc() {
        let mut f = Fixture::new(10);
        let mut d = ClusterDistributor::new(cluster(&f, 9), 1000);
        let mut blocks = cubes(3);
        let mut refs: Vec<&mut Block> = blocks.iter_mut().collect();
        d.distribute_blocks(&mut refs, ctx!(f), true).unwrap();

        let mut c = d.cluster().clone();
        c.update_after_pickup(BlockId(1));
        assert_eq!(c.blocks(), &[BlockId(0), BlockId(2)]);

        c.blocks_recalc(&f.grid);
        let mut ids = c.blocks().to_vec();
        ids.sort();
        assert_eq!(ids, vec![BlockId(0), BlockId(1), BlockId(2)]);
    }

    #[test]
    #[should_panic(expected = "not a member")]
    fn pickup_of_non_member_is_fatal() {
        let f = Fixture::new(10);
        let mut c = cluster(&f, 4);
        c.update_after_pickup(BlockId(3));
    }

    #[test]
    fn drop_records_membership() {
        let f = Fixture::new(10);
        let mut c = cluster(&f, 4);
        let mut b = Block::new(BlockId(8), BlockKind::Cube, RES);
        let fp = b.footprint_at(Vec2z::new(3, 3).to_real(RES), RES);
        b.place(fp);
        c.update_after_drop(&b);
        assert_eq!(c.blocks(), &[BlockId(8)]);
    }
}

#[cfg(test)]
mod dispatcher {
    use swarm_core::{BlockDistConfig, BlockId, BlockManifest, DistType};
    use swarm_repr::{Block, SpatialEntity};

    use super::helpers::{Fixture, cubes};
    use crate::{BlockDistributor, DistError, Dispatcher};

    fn cfg(dist_type: DistType, capacity: Option<usize>) -> BlockDistConfig {
        BlockDistConfig {
            dist_type,
            manifest: BlockManifest::default(),
            cluster_capacity: capacity,
            ..BlockDistConfig::default()
        }
    }

    #[test]
    fn random_stays_off_the_border() {
        let mut f = Fixture::new(10);
        let mut d = Dispatcher::new(&cfg(DistType::Random, None), &f.grid).unwrap();
        assert!(!d.has_clusters());
        let mut blocks = cubes(20);
        let mut refs: Vec<&mut Block> = blocks.iter_mut().collect();
        d.distribute_blocks(&mut refs, ctx!(f), true).unwrap();
        for b in &blocks {
            let a = b.danchor().unwrap();
            assert!((1..=8).contains(&a.x) && (1..=8).contains(&a.y), "{a}");
        }
    }

    #[test]
    fn quad_source_regions_are_disjoint() {
        let f = Fixture::new(20);
        let d = Dispatcher::new(&cfg(DistType::QuadSource, None), &f.grid).unwrap();
        let clusters = d.block_clusters();
        assert_eq!(clusters.len(), 4);
        for (i, a) in clusters.iter().enumerate() {
            for b in &clusters[i + 1..] {
                assert!(a.view().cells().all(|c| !b.contains_cell(c)));
            }
        }
    }

    #[test]
    fn dual_source_spreads_round_robin() {
        let mut f = Fixture::new(10);
        let mut d = Dispatcher::new(&cfg(DistType::DualSource, None), &f.grid).unwrap();
        let mut blocks = cubes(6);
        let mut refs: Vec<&mut Block> = blocks.iter_mut().collect();
        assert_eq!(d.distribute_blocks(&mut refs, ctx!(f), true).unwrap(), 6);
        let counts: Vec<usize> = d.block_clusters().iter().map(|c| c.n_blocks()).collect();
        assert_eq!(counts, vec![3, 3]);
    }

    #[test]
    fn falls_through_full_clusters() {
        let mut f = Fixture::new(10);
        let mut d = Dispatcher::new(&cfg(DistType::DualSource, Some(1)), &f.grid).unwrap();
        let mut blocks = cubes(3);
        let (two, rest) = blocks.split_at_mut(2);
        for b in two.iter_mut() {
            d.distribute_block(b, ctx!(f)).unwrap();
        }
        let err = d.distribute_block(&mut rest[0], ctx!(f)).unwrap_err();
        assert!(matches!(err, DistError::CapacityReached { .. }));
    }

    #[test]
    fn pickup_bookkeeping_uses_old_anchor() {
        let mut f = Fixture::new(10);
        let mut d = Dispatcher::new(&cfg(DistType::SingleSource, None), &f.grid).unwrap();
        let mut blocks = cubes(2);
        let mut refs: Vec<&mut Block> = blocks.iter_mut().collect();
        d.distribute_blocks(&mut refs, ctx!(f), true).unwrap();

        let anchor = blocks[0].danchor().unwrap();
        d.update_after_pickup(BlockId(0), anchor);
        assert_eq!(d.block_clusters()[0].blocks(), &[BlockId(1)]);
    }
}
