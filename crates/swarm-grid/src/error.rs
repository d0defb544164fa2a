//! Grid error type.

use thiserror::Error;

use swarm_core::Vec2z;

/// Recoverable errors produced by `swarm-grid`.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("cell {coord} outside {xdsize}x{ydsize} grid")]
    OutOfBounds { coord: Vec2z, xdsize: usize, ydsize: usize },

    #[error("view at {origin} with shape {shape} does not fit in the grid")]
    BadView { origin: Vec2z, shape: Vec2z },
}

pub type GridResult<T> = Result<T, GridError>;
