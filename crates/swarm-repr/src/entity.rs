//! The shared footprint abstraction.

use swarm_core::{DiscreteSpan, EntityId, EntityRef, RealRect, Vec2d, Vec2z};

/// Real and discrete extent of an entity that is currently in the arena.
///
/// The discrete spans are authoritative for the grid: a cell belongs to the
/// extent iff both of its coordinates fall inside them.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Footprint {
    pub rect: RealRect,
    /// The cell conceptually holding the entity.
    pub anchor: Vec2z,
    pub xdspan: DiscreteSpan,
    pub ydspan: DiscreteSpan,
}

impl Footprint {
    /// Footprint whose lower-left corner is `ranchor`; the anchor cell is the
    /// lower-left cell.  Used for blocks.
    pub fn anchored(ranchor: Vec2d, rdims: Vec2d, resolution: f64) -> Self {
        let rect = RealRect::from_anchor(ranchor, rdims);
        let xdspan = rect.x.to_discrete(resolution);
        let ydspan = rect.y.to_discrete(resolution);
        Self {
            rect,
            anchor: Vec2z::new(xdspan.lb, ydspan.lb),
            xdspan,
            ydspan,
        }
    }

    /// Footprint centred on `center`; the anchor cell is the one containing
    /// the center.  Used for caches and nests.
    pub fn centered(center: Vec2d, rdims: Vec2d, resolution: f64) -> Self {
        let rect = RealRect::from_center(center, rdims);
        Self {
            rect,
            anchor: center.discretize(resolution),
            xdspan: rect.x.to_discrete(resolution),
            ydspan: rect.y.to_discrete(resolution),
        }
    }

    #[inline]
    pub fn contains_cell(&self, c: Vec2z) -> bool {
        self.xdspan.contains(c.x) && self.ydspan.contains(c.y)
    }

    /// Every cell of the extent, row-major from the lower-left.
    pub fn cells(&self) -> impl Iterator<Item = Vec2z> + '_ {
        self.ydspan
            .iter()
            .flat_map(move |y| self.xdspan.iter().map(move |x| Vec2z::new(x, y)))
    }

    /// Every cell of the extent except the anchor.
    pub fn extent_cells(&self) -> impl Iterator<Item = Vec2z> + '_ {
        let anchor = self.anchor;
        self.cells().filter(move |c| *c != anchor)
    }

    #[inline]
    pub fn n_cells(&self) -> usize {
        self.xdspan.len() * self.ydspan.len()
    }
}

/// An entity that can occupy grid cells.
pub trait SpatialEntity {
    /// How grid cells refer to this entity.
    fn entity_ref(&self) -> EntityRef;

    fn entity_id(&self) -> EntityId;

    /// The entity's extent, or `None` while it is out of sight.
    fn footprint(&self) -> Option<&Footprint>;

    /// Real dimensions, independent of placement.
    fn rdims(&self) -> Vec2d;

    #[inline]
    fn is_out_of_sight(&self) -> bool {
        self.footprint().is_none()
    }

    /// Lower-left corner of the real extent.
    fn ranchor(&self) -> Option<Vec2d> {
        self.footprint().map(|f| Vec2d::new(f.rect.x.lb, f.rect.y.lb))
    }

    fn danchor(&self) -> Option<Vec2z> {
        self.footprint().map(|f| f.anchor)
    }

    fn rcenter(&self) -> Option<Vec2d> {
        self.footprint().map(|f| f.rect.center())
    }

    /// `true` if `p` lies inside the real extent.  Always `false` while out
    /// of sight.
    fn contains_point(&self, p: Vec2d) -> bool {
        self.footprint().is_some_and(|f| f.rect.contains(p))
    }

    fn contains_cell(&self, c: Vec2z) -> bool {
        self.footprint().is_some_and(|f| f.contains_cell(c))
    }
}
