//! Arena error type.

use thiserror::Error;

use swarm_core::{BlockId, CoreError, Vec2z};
use swarm_dist::DistError;
use swarm_grid::GridError;
use swarm_penalty::PenaltyError;

/// Recoverable arena errors.  Invariant violations panic instead.
#[derive(Debug, Error)]
pub enum ArenaError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Dist(#[from] DistError),

    #[error(transparent)]
    Penalty(#[from] PenaltyError),

    #[error("{block} cannot be placed at {at}: footprint blocked or outside the arena")]
    PlacementConflict { block: BlockId, at: Vec2z },

    #[error("{0} is already in the arena")]
    AlreadyPlaced(BlockId),
}

pub type ArenaResult<T> = Result<T, ArenaError>;
