//! Per-cell finite state.

use std::fmt;

use swarm_core::EntityRef;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellState {
    /// Not yet observed; every cell starts here until initial distribution
    /// finishes.
    #[default]
    Unknown,
    Empty,
    HasBlock,
    HasCache,
    BlockExtent,
    CacheExtent,
    NestExtent,
}

impl CellState {
    /// States a cell may be claimed from.
    #[inline]
    pub fn is_claimable(self) -> bool {
        matches!(self, CellState::Empty | CellState::Unknown)
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CellState::Unknown => "UNKNOWN",
            CellState::Empty => "EMPTY",
            CellState::HasBlock => "HAS_BLOCK",
            CellState::HasCache => "HAS_CACHE",
            CellState::BlockExtent => "BLOCK_EXTENT",
            CellState::CacheExtent => "CACHE_EXTENT",
            CellState::NestExtent => "NEST_EXTENT",
        };
        f.write_str(s)
    }
}

/// One grid cell: a state plus the entity occupying it, if any.
///
/// Empty and unknown cells hold no entity; every other state holds exactly
/// one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    state: CellState,
    entity: Option<EntityRef>,
}

impl Cell {
    #[inline]
    pub fn state(&self) -> CellState {
        self.state
    }

    #[inline]
    pub fn entity(&self) -> Option<EntityRef> {
        self.entity
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.state == CellState::Empty
    }

    #[inline]
    pub(crate) fn set(&mut self, state: CellState, entity: Option<EntityRef>) {
        self.state = state;
        self.entity = entity;
    }
}
