//! `swarm-sim` — tick runner for the swarm foraging arena.
//!
//! # Tick loop
//!
//! ```text
//! for each tick t:
//!   ① Start     — observer.on_tick_start(t)
//!   ② Zombies   — map.update(t) releases caches removed last tick
//!   ③ Actors    — for every actor (parallel with the `parallel` feature):
//!                   control_step(map, t)
//!                   interactors in order until one reports an event:
//!                     free pickup, free drop, nest drop,
//!                     cached pickup, cache drop
//!   ④ Tally     — TickStats merged across actors
//!   ⑤ End       — observer.on_tick_end(t, stats, map); clock advances
//! ```
//!
//! Arena mutations serialise on the map's locks; penalty bookkeeping
//! serialises on each handler's own lock.  With `parallel`, the order in
//! which actors sharing a tick commit is up to the scheduler.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Steps actors on Rayon's thread pool.                   |
//! | `serde`    | Derives `Serialize`/`Deserialize` on `TickStats`.      |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use swarm_sim::{NoopObserver, SwarmBuilder};
//!
//! let mut swarm = SwarmBuilder::new(config, robots)
//!     .waveform_all(WaveformConfig::constant(5))
//!     .build()?;
//! swarm.run_until(Tick(10_000), &mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod stats;
pub mod swarm;

#[cfg(test)]
mod tests;

pub use builder::SwarmBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SwarmObserver};
pub use stats::TickStats;
pub use swarm::{Swarm, SwarmActor};
