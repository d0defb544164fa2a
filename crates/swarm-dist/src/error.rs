//! Distribution error type.

use thiserror::Error;

use swarm_core::{BlockId, ClusterId, Vec2z};
use swarm_grid::GridError;

/// Placement failures.  None of these are fatal on their own; the caller
/// decides whether to retry, skip, or escalate.
#[derive(Debug, Error)]
pub enum DistError {
    #[error("no free location for {block} after {tries} tries")]
    RetriesExhausted { block: BlockId, tries: usize },

    #[error("{cluster} already holds its capacity of {capacity} blocks")]
    CapacityReached { cluster: ClusterId, capacity: usize },

    #[error("{block} does not fit in a view of shape {shape}")]
    NoFit { block: BlockId, shape: Vec2z },

    #[error("none of {attempted} blocks could be distributed")]
    NoneDistributed { attempted: usize },

    #[error("no distributors configured")]
    NoDistributors,

    #[error(transparent)]
    Grid(#[from] GridError),
}

pub type DistResult<T> = Result<T, DistError>;
