//! Rectangular sub-regions of the grid.

use swarm_core::{DiscreteSpan, Vec2z};

/// A rectangle of cells `[origin, origin + shape)`.
///
/// Views carry no borrow of the grid; they are plain coordinates validated
/// against it at construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridView {
    pub origin: Vec2z,
    pub shape: Vec2z,
}

impl GridView {
    #[inline]
    pub fn xspan(&self) -> DiscreteSpan {
        DiscreteSpan::new(self.origin.x, self.origin.x + self.shape.x - 1)
    }

    #[inline]
    pub fn yspan(&self) -> DiscreteSpan {
        DiscreteSpan::new(self.origin.y, self.origin.y + self.shape.y - 1)
    }

    #[inline]
    pub fn contains(&self, c: Vec2z) -> bool {
        self.xspan().contains(c.x) && self.yspan().contains(c.y)
    }

    #[inline]
    pub fn n_cells(&self) -> usize {
        self.shape.x * self.shape.y
    }

    pub fn cells(&self) -> impl Iterator<Item = Vec2z> {
        let (xs, ys) = (self.xspan(), self.yspan());
        ys.iter().flat_map(move |y| xs.iter().map(move |x| Vec2z::new(x, y)))
    }
}
