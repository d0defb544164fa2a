//! Unit tests for swarm-grid.

#[cfg(test)]
mod helpers {
    use swarm_core::{BlockId, Vec2d};
    use swarm_repr::{Block, BlockKind};

    use crate::ArenaGrid;

    /// 10×10 grid at 0.2 m resolution.
    pub fn grid() -> ArenaGrid {
        ArenaGrid::new(10, 10, 0.2)
    }

    /// A free block of `kind` whose anchor cell is `(x, y)`.
    pub fn free_block(id: u32, kind: BlockKind, x: usize, y: usize) -> Block {
        let mut b = Block::new(BlockId(id), kind, 0.2);
        let f = b.footprint_at(Vec2d::new(x as f64 * 0.2, y as f64 * 0.2), 0.2);
        b.place(f);
        b
    }
}

#[cfg(test)]
mod transitions {
    use swarm_core::{BlockId, EntityRef, NestId, Vec2z};

    use super::helpers::grid;
    use crate::CellState;

    #[test]
    fn starts_unknown() {
        let g = grid();
        assert!(g.cells().all(|(_, c)| c.state() == CellState::Unknown));
        assert_eq!(g.cells().count(), 100);
    }

    #[test]
    fn mark_and_empty() {
        let mut g = grid();
        let c = Vec2z::new(3, 3);
        g.mark_has_block(c, BlockId(1));
        assert_eq!(g.state(c), CellState::HasBlock);
        assert_eq!(g.cell(c).entity(), Some(EntityRef::Block(BlockId(1))));
        g.mark_empty(c);
        assert_eq!(g.state(c), CellState::Empty);
        assert_eq!(g.cell(c).entity(), None);
    }

    #[test]
    #[should_panic(expected = "invariant violated")]
    fn double_claim_is_fatal() {
        let mut g = grid();
        g.mark_has_block(Vec2z::new(1, 1), BlockId(1));
        g.mark_nest_extent(Vec2z::new(1, 1), NestId(0));
    }

    #[test]
    #[should_panic(expected = "outside 10x10 grid")]
    fn out_of_bounds_is_fatal() {
        let g = grid();
        g.cell(Vec2z::new(10, 0));
    }

    #[test]
    fn get_reports_out_of_bounds() {
        let g = grid();
        assert!(g.get(Vec2z::new(0, 10)).is_err());
        assert!(g.get(Vec2z::new(9, 9)).is_ok());
    }

    #[test]
    fn empty_unknown_cells_counts() {
        let mut g = grid();
        g.mark_has_block(Vec2z::new(0, 0), BlockId(0));
        g.mark_empty(Vec2z::new(1, 0));
        assert_eq!(g.empty_unknown_cells(), 98);
        assert_eq!(g.state(Vec2z::new(0, 0)), CellState::HasBlock);
        assert!(g.cells().all(|(_, c)| c.state() != CellState::Unknown));
        g.verify_cells();
    }
}

#[cfg(test)]
mod extents {
    use swarm_core::{BlockId, CacheId, CacheKey, NestId, Tick, Vec2d, Vec2z};
    use swarm_repr::{BlockKind, Cache, Nest};

    use super::helpers::{free_block, grid};
    use crate::CellState;

    #[test]
    fn ramp_extent_roundtrip() {
        let mut g = grid();
        g.empty_unknown_cells();
        let b = free_block(0, BlockKind::Ramp, 3, 3);
        g.set_block_extent(&b);
        assert_eq!(g.state(Vec2z::new(3, 3)), CellState::HasBlock);
        assert_eq!(g.state(Vec2z::new(4, 3)), CellState::BlockExtent);
        g.verify_entity(&b);

        g.clear_extent(&b);
        // Anchor untouched by the generic clear.
        assert_eq!(g.state(Vec2z::new(3, 3)), CellState::HasBlock);
        assert_eq!(g.state(Vec2z::new(4, 3)), CellState::Empty);
        g.mark_empty(Vec2z::new(3, 3));
        assert!(g.cells().all(|(_, c)| c.is_empty()));
    }

    #[test]
    fn cache_extent_marks_center() {
        let mut g = grid();
        g.empty_unknown_cells();
        let cache = Cache::new(
            CacheId(0),
            CacheKey::default(),
            Vec2d::new(1.1, 1.1),
            Vec2d::new(0.6, 0.6),
            0.2,
            vec![BlockId(0), BlockId(1)],
            Tick(0),
        );
        g.set_cache_extent(&cache);
        assert_eq!(g.state(Vec2z::new(5, 5)), CellState::HasCache);
        assert_eq!(g.state(Vec2z::new(4, 4)), CellState::CacheExtent);
        g.verify_entity(&cache);
        g.clear_extent(&cache);
        let n_empty = g.cells().filter(|(_, c)| c.is_empty()).count();
        assert_eq!(n_empty, 99);
    }

    #[test]
    fn nest_cells_are_all_extent() {
        let mut g = grid();
        let n = Nest::new(NestId(0), Vec2d::new(1.0, 1.0), Vec2d::new(0.4, 0.4), 0.2);
        g.set_nest_extent(&n);
        for c in n.extent().cells() {
            assert_eq!(g.state(c), CellState::NestExtent);
        }
        g.verify_entity(&n);
    }

    #[test]
    #[should_panic(expected = "disagrees with BlockId(0)")]
    fn verify_detects_stale_extent() {
        let mut g = grid();
        let b = free_block(0, BlockKind::Ramp, 3, 3);
        g.set_block_extent(&b);
        g.mark_empty(Vec2z::new(4, 3));
        g.verify_entity(&b);
    }

    #[test]
    #[should_panic(expected = "expected BLOCK_EXTENT")]
    fn clear_extent_rejects_foreign_cells() {
        let mut g = grid();
        let b = free_block(0, BlockKind::Ramp, 3, 3);
        g.mark_has_block(Vec2z::new(3, 3), BlockId(0));
        g.mark_has_block(Vec2z::new(4, 3), BlockId(9));
        g.clear_extent(&b);
    }

    #[test]
    fn cache_to_block_handover() {
        let mut g = grid();
        g.mark_has_cache(Vec2z::new(5, 5), CacheKey::default());
        g.convert_cache_to_block(Vec2z::new(5, 5), BlockId(3));
        assert_eq!(g.state(Vec2z::new(5, 5)), CellState::HasBlock);
    }
}

#[cfg(test)]
mod views {
    use swarm_core::{BlockId, Vec2z};

    use super::helpers::grid;

    #[test]
    fn subview_bounds() {
        let g = grid();
        assert!(g.subview(Vec2z::new(8, 8), Vec2z::new(2, 2)).is_ok());
        assert!(g.subview(Vec2z::new(8, 8), Vec2z::new(3, 2)).is_err());
        assert!(g.subview(Vec2z::new(0, 0), Vec2z::new(0, 2)).is_err());
    }

    #[test]
    fn view_contains_and_iterates() {
        let g = grid();
        let v = g.subview(Vec2z::new(2, 3), Vec2z::new(3, 2)).unwrap();
        assert!(v.contains(Vec2z::new(4, 4)));
        assert!(!v.contains(Vec2z::new(5, 4)));
        assert_eq!(v.cells().count(), v.n_cells());
        assert_eq!(g.view().n_cells(), 100);
    }

    #[test]
    fn blocks_in_view() {
        let mut g = grid();
        g.mark_has_block(Vec2z::new(2, 3), BlockId(1));
        g.mark_has_block(Vec2z::new(8, 8), BlockId(2));
        let v = g.subview(Vec2z::new(0, 0), Vec2z::new(5, 5)).unwrap();
        assert_eq!(g.blocks_in(&v), vec![BlockId(1)]);
    }
}
