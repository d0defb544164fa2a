//! `swarm-repr` — spatial entities of the foraging arena.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`entity`]    | `SpatialEntity` trait, `Footprint`                         |
//! | [`block`]     | `Block`, `BlockKind`, `BlockPlacement`, `BlockStats`       |
//! | [`cache`]     | `Cache` (multi-cell, holds constituent blocks)             |
//! | [`nest`]      | `Nest` (static, multi-cell)                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on all public types.     |
//!
//! Entities never own grid cells; cells refer back to them through
//! [`swarm_core::EntityRef`].

pub mod block;
pub mod cache;
pub mod entity;
pub mod nest;


pub use block::{Block, BlockKind, BlockPlacement, BlockStats};
pub use cache::{Cache, CACHE_MIN_BLOCKS};
pub use entity::{Footprint, SpatialEntity};
pub use nest::Nest;
