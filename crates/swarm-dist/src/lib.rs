//! `swarm-dist` — placing blocks into empty grid regions.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                 |
//! |------------------|----------------------------------------------------------|
//! | [`distributor`]  | `BlockDistributor` trait, `DistContext`, batch policy    |
//! | [`random`]       | `RandomDistributor` (uniform sampling over a view)       |
//! | [`cluster`]      | `BlockCluster`, `ClusterDistributor` (capacity-bounded)  |
//! | [`dispatcher`]   | `Dispatcher` (distributor set built from config)         |
//! | [`error`]        | `DistError`, `DistResult<T>`                             |
//!
//! Every strategy works against a caller-supplied avoid list of real
//! rectangles.  A successful placement marks the grid, verifies it, and
//! appends the new footprint to the avoid list so later blocks in the same
//! batch cannot collide with it.

pub mod cluster;
pub mod dispatcher;
pub mod distributor;
pub mod error;
pub mod random;

#[cfg(test)]
mod tests;

pub use cluster::{BlockCluster, ClusterDistributor};
pub use dispatcher::Dispatcher;
pub use distributor::{BlockDistributor, DistContext};
pub use error::{DistError, DistResult};
pub use random::RandomDistributor;
