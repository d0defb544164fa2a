//! `swarm-penalty` — when does a pending pickup or drop actually commit?
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`waveform`]  | `Waveform` trait, the periodic shapes, `waveform_from_config` |
//! | [`record`]    | `PenaltyRecord`                                            |
//! | [`handler`]   | `PenaltyHandler` (per operation class, own `RwLock`)       |
//! | [`error`]     | `PenaltyError`, `PenaltyResult<T>`                         |
//!
//! # Actor lifecycle
//!
//! ```text
//!   idle ──penalty_init──► waiting ──t ≥ start+duration──► satisfied
//!     ▲                       │                                │
//!     └──── penalty_abort ────┘                                │
//!     └──────────────── penalty_remove (after commit) ─────────┘
//! ```
//!
//! No two records held by one handler finish on the same tick.

pub mod error;
pub mod handler;
pub mod record;
pub mod waveform;

#[cfg(test)]
mod tests;

pub use error::{PenaltyError, PenaltyResult};
pub use handler::PenaltyHandler;
pub use record::PenaltyRecord;
pub use waveform::{
    ConstantWaveform, NullWaveform, SawtoothWaveform, SineWaveform, SquareWaveform, Waveform,
    waveform_from_config,
};
