use swarm_arena::ArenaError;
use swarm_core::{ActorId, Tick};
use swarm_penalty::PenaltyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("swarm configuration error: {0}")]
    Config(String),

    #[error("{0} appears more than once in the swarm")]
    DuplicateActor(ActorId),

    #[error("cannot run until {end}: the swarm is already at {now}")]
    EndInPast { end: Tick, now: Tick },

    #[error(transparent)]
    Arena(#[from] ArenaError),

    #[error("penalty waveform: {0}")]
    Penalty(#[from] PenaltyError),
}

pub type SimResult<T> = Result<T, SimError>;
