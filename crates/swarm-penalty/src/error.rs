//! Penalty-subsystem error type.

use thiserror::Error;

use swarm_core::WaveformKind;

#[derive(Debug, Error)]
pub enum PenaltyError {
    #[error("{kind:?} waveform parameter {param} must be finite, got {value}")]
    NonFinite { kind: WaveformKind, param: &'static str, value: f64 },

    #[error("{kind:?} waveform needs a positive frequency, got {frequency}")]
    BadFrequency { kind: WaveformKind, frequency: f64 },
}

pub type PenaltyResult<T> = Result<T, PenaltyError>;
