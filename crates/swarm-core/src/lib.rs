//! `swarm-core` — foundational types for the swarm foraging arena.
//!
//! This crate is a dependency of every other `swarm-*` crate.  It has no
//! `swarm-*` dependencies and keeps external ones small (`rand`, `slotmap`,
//! `thiserror`, `tracing`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `BlockId`, `CacheId`, `NestId`, `ActorId`, `ClusterId`,   |
//! |                 | `CacheKey`, `EntityRef`, `EntityId`                       |
//! | [`geo`]         | `Vec2d`, `Vec2z`, spans, `RealRect`, discretisation       |
//! | [`time`]        | `Tick`                                                    |
//! | [`rng`]         | `ArenaRng` (explicitly injected, never global)            |
//! | [`config`]      | `ArenaConfig` and the plain configuration structs         |
//! | [`error`]       | `CoreError`, `CoreResult`, the `invariant!` macro         |
//! | [`sync`]        | Poison-is-fatal lock helpers                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod sync;
pub mod time;


// Used by the exported `invariant!` macros so callers need not depend on
// `tracing` themselves.
#[doc(hidden)]
pub use tracing as __tracing;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{
    ArenaConfig, BlockDistConfig, BlockManifest, DistType, GridConfig, NestConfig,
    WaveformConfig, WaveformKind,
};
pub use error::{CoreError, CoreResult};
pub use geo::{DiscreteSpan, RealRect, RealSpan, Vec2d, Vec2z};
pub use ids::{ActorId, BlockId, CacheId, CacheKey, ClusterId, EntityId, EntityRef, NestId};
pub use rng::ArenaRng;
pub use time::Tick;
