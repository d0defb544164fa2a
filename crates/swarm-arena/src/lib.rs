//! `swarm-arena` — the shared foraging arena and every path that mutates it.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                    |
//! |-----------------|-------------------------------------------------------------|
//! | [`map`]         | `ArenaMap`: locks, distribution, pickup, queries, checks    |
//! | [`locking`]     | `LockSet` tokens, `Held`                                    |
//! | [`store`]       | `BlockStore` (every block, indexed by `BlockId`)            |
//! | [`caching`]     | `CacheStore`, `CacheSpec`, `IdPool`, zombie caches          |
//! | [`ops`]         | `ArenaOp`, `OpOutcome`, `apply`, two-phase `commit`         |
//! | [`interactor`]  | `Interactor` trait and the five per-class interactors       |
//! | [`host`]        | `HostRegistry`, `ForagingActor`, `OpKind`                   |
//! | [`error`]       | `ArenaError`, `ArenaResult<T>`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on ops and outcomes.     |
//!
//! # Example
//!
//! ```
//! use swarm_arena::{ArenaMap, NoopHost};
//! use swarm_core::{ArenaConfig, NestConfig, Vec2d};
//!
//! let mut cfg = ArenaConfig::default();
//! cfg.nests.push(NestConfig { center: Vec2d::new(1.0, 1.0), dims: Vec2d::new(0.4, 0.4) });
//! let map = ArenaMap::new(&cfg, Box::new(NoopHost)).unwrap();
//! assert_eq!(map.distribute_all_blocks(), 4);
//! map.verify_all();
//! ```

pub mod caching;
pub mod error;
pub mod host;
pub mod interactor;
pub mod locking;
pub mod map;
pub mod ops;
pub mod store;


pub use caching::{CacheSpec, CacheStore, IdPool};
pub use error::{ArenaError, ArenaResult};
pub use host::{ForagingActor, HostRegistry, NoopHost, OpKind};
pub use interactor::{
    BlockPickupInteractor, CacheBlockDropInteractor, CachedBlockPickupInteractor,
    FreeBlockDropInteractor, Interactor, InteractorStatus, NestDropInteractor,
    interactor_for, standard_interactors,
};
pub use locking::{Held, LockSet};
pub use map::ArenaMap;
pub use ops::{ArenaOp, OpOutcome, commit, commit_with, notify};
pub use store::BlockStore;
