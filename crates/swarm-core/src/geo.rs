//! Real and discrete coordinates, spans, and discretisation.
//!
//! The arena has two coordinate systems:
//!
//! - **Real** (`Vec2d`, `RealSpan`): metres, `f64`, used for entity extents
//!   and robot positions.
//! - **Discrete** (`Vec2z`, `DiscreteSpan`): grid cell indices.  A cell
//!   `(i, j)` covers `[i·res, (i+1)·res) × [j·res, (j+1)·res)`.
//!
//! Discretisation absorbs float error with [`EPSILON`]: `0.6 / 0.2` must land
//! in cell 3, not cell 2.

use std::fmt;

/// Tolerance used by every real-valued comparison in the arena.
pub const EPSILON: f64 = 1e-9;

// ── Vec2d ─────────────────────────────────────────────────────────────────────

/// A real-valued 2D coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2d {
    pub x: f64,
    pub y: f64,
}

impl Vec2d {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The cell containing this point at the given resolution.  Negative
    /// coordinates clamp to 0.
    #[inline]
    pub fn discretize(self, resolution: f64) -> Vec2z {
        Vec2z::new(
            discretize(self.x, resolution),
            discretize(self.y, resolution),
        )
    }

    #[inline]
    pub fn distance(self, other: Vec2d) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl std::ops::Add for Vec2d {
    type Output = Vec2d;
    #[inline]
    fn add(self, rhs: Vec2d) -> Vec2d {
        Vec2d::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2d {
    type Output = Vec2d;
    #[inline]
    fn sub(self, rhs: Vec2d) -> Vec2d {
        Vec2d::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Vec2d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

// ── Vec2z ─────────────────────────────────────────────────────────────────────

/// A discrete grid coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2z {
    pub x: usize,
    pub y: usize,
}

impl Vec2z {
    #[inline]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Real coordinate of the cell's lower-left corner.
    #[inline]
    pub fn to_real(self, resolution: f64) -> Vec2d {
        Vec2d::new(self.x as f64 * resolution, self.y as f64 * resolution)
    }

    /// Real coordinate of the cell's center.
    #[inline]
    pub fn cell_center(self, resolution: f64) -> Vec2d {
        Vec2d::new(
            (self.x as f64 + 0.5) * resolution,
            (self.y as f64 + 0.5) * resolution,
        )
    }
}

impl fmt::Display for Vec2z {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ── Scalar helpers ────────────────────────────────────────────────────────────

/// Index of the cell containing real coordinate `v`.
#[inline]
pub fn discretize(v: f64, resolution: f64) -> usize {
    ((v + EPSILON) / resolution).floor().max(0.0) as usize
}

/// Number of cells needed to cover a real length (at least 1).
#[inline]
pub fn cells_for(len: f64, resolution: f64) -> usize {
    ((len - EPSILON) / resolution).ceil().max(1.0) as usize
}

// ── RealSpan ──────────────────────────────────────────────────────────────────

/// Closed real interval `[lb, ub]`.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RealSpan {
    pub lb: f64,
    pub ub: f64,
}

impl RealSpan {
    #[inline]
    pub fn new(lb: f64, ub: f64) -> Self {
        debug_assert!(lb <= ub, "span lb {lb} > ub {ub}");
        Self { lb, ub }
    }

    /// Span starting at `anchor` with length `dim`.
    #[inline]
    pub fn from_anchor(anchor: f64, dim: f64) -> Self {
        Self::new(anchor, anchor + dim)
    }

    /// Span centred on `center` with length `dim`.
    #[inline]
    pub fn from_center(center: f64, dim: f64) -> Self {
        Self::new(center - dim / 2.0, center + dim / 2.0)
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.ub - self.lb
    }

    #[inline]
    pub fn center(&self) -> f64 {
        (self.lb + self.ub) / 2.0
    }

    /// `true` if `v` lies within the closed interval.
    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.lb - EPSILON && v <= self.ub + EPSILON
    }

    /// Interior overlap.  Spans that only share an endpoint do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &RealSpan) -> bool {
        self.lb < other.ub - EPSILON && other.lb < self.ub - EPSILON
    }

    /// The cells this span touches at `resolution`.
    pub fn to_discrete(&self, resolution: f64) -> DiscreteSpan {
        let lb = discretize(self.lb, resolution);
        let ub = ((self.ub - EPSILON) / resolution).ceil().max(1.0) as usize - 1;
        DiscreteSpan::new(lb, ub.max(lb))
    }
}

impl fmt::Display for RealSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3}, {:.3}]", self.lb, self.ub)
    }
}

// ── DiscreteSpan ──────────────────────────────────────────────────────────────

/// Inclusive range of cell indices `[lb, ub]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiscreteSpan {
    pub lb: usize,
    pub ub: usize,
}

impl DiscreteSpan {
    #[inline]
    pub fn new(lb: usize, ub: usize) -> Self {
        debug_assert!(lb <= ub, "span lb {lb} > ub {ub}");
        Self { lb, ub }
    }

    #[inline]
    pub fn contains(&self, v: usize) -> bool {
        v >= self.lb && v <= self.ub
    }

    /// Number of cells covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.ub - self.lb + 1
    }

    /// Never true: a discrete span always covers at least one cell.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn iter(&self) -> std::ops::RangeInclusive<usize> {
        self.lb..=self.ub
    }
}

impl fmt::Display for DiscreteSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lb, self.ub)
    }
}

// ── RealRect ──────────────────────────────────────────────────────────────────

/// Axis-aligned real rectangle built from two spans.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RealRect {
    pub x: RealSpan,
    pub y: RealSpan,
}

impl RealRect {
    #[inline]
    pub fn new(x: RealSpan, y: RealSpan) -> Self {
        Self { x, y }
    }

    /// Rectangle with lower-left corner `anchor` and size `dims`.
    #[inline]
    pub fn from_anchor(anchor: Vec2d, dims: Vec2d) -> Self {
        Self::new(
            RealSpan::from_anchor(anchor.x, dims.x),
            RealSpan::from_anchor(anchor.y, dims.y),
        )
    }

    /// Rectangle centred on `center` with size `dims`.
    #[inline]
    pub fn from_center(center: Vec2d, dims: Vec2d) -> Self {
        Self::new(
            RealSpan::from_center(center.x, dims.x),
            RealSpan::from_center(center.y, dims.y),
        )
    }

    /// A 2D placement conflict requires overlap on both axes.
    #[inline]
    pub fn overlaps(&self, other: &RealRect) -> bool {
        self.x.overlaps(&other.x) && self.y.overlaps(&other.y)
    }

    #[inline]
    pub fn contains(&self, p: Vec2d) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y)
    }

    #[inline]
    pub fn center(&self) -> Vec2d {
        Vec2d::new(self.x.center(), self.y.center())
    }
}

impl fmt::Display for RealRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}
