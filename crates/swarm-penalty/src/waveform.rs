//! Penalty-duration functions of the current tick.
//!
//! All periodic shapes share the form
//! `value(t) = amplitude · shape(2π · frequency · t + phase) + offset`
//! where `shape` ranges over [-1, 1].  Handlers floor the value and clamp it
//! at zero, so negative excursions simply mean "no extra delay".

use std::f64::consts::TAU;

use swarm_core::{Tick, WaveformConfig, WaveformKind};

use crate::error::{PenaltyError, PenaltyResult};

/// A deterministic function of the tick.  Injected into each
/// `PenaltyHandler`; there is no shared generator state.
pub trait Waveform: Send + Sync {
    fn value(&self, t: Tick) -> f64;
}

/// Always 0.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullWaveform;

impl Waveform for NullWaveform {
    #[inline]
    fn value(&self, _t: Tick) -> f64 {
        0.0
    }
}

/// Always `value`.
#[derive(Copy, Clone, Debug)]
pub struct ConstantWaveform {
    pub value: f64,
}

impl Waveform for ConstantWaveform {
    #[inline]
    fn value(&self, _t: Tick) -> f64 {
        self.value
    }
}

/// Parameters shared by the periodic shapes.
#[derive(Copy, Clone, Debug)]
struct Periodic {
    amplitude: f64,
    frequency: f64,
    phase: f64,
    offset: f64,
}

impl Periodic {
    fn from_config(cfg: &WaveformConfig) -> Self {
        Self {
            amplitude: cfg.amplitude,
            frequency: cfg.frequency,
            phase: cfg.phase,
            offset: cfg.offset,
        }
    }

    #[inline]
    fn angle(&self, t: Tick) -> f64 {
        TAU * self.frequency * t.0 as f64 + self.phase
    }
}

#[derive(Copy, Clone, Debug)]
pub struct SineWaveform(Periodic);

impl Waveform for SineWaveform {
    fn value(&self, t: Tick) -> f64 {
        let p = &self.0;
        p.amplitude * p.angle(t).sin() + p.offset
    }
}

/// +amplitude on the first half of each period, -amplitude on the second.
#[derive(Copy, Clone, Debug)]
pub struct SquareWaveform(Periodic);

impl Waveform for SquareWaveform {
    fn value(&self, t: Tick) -> f64 {
        let p = &self.0;
        let s = if p.angle(t).rem_euclid(TAU) < TAU / 2.0 { 1.0 } else { -1.0 };
        p.amplitude * s + p.offset
    }
}

/// Rises linearly from -amplitude to +amplitude over each period.
#[derive(Copy, Clone, Debug)]
pub struct SawtoothWaveform(Periodic);

impl Waveform for SawtoothWaveform {
    fn value(&self, t: Tick) -> f64 {
        let p = &self.0;
        let frac = p.angle(t).rem_euclid(TAU) / TAU;
        p.amplitude * (2.0 * frac - 1.0) + p.offset
    }
}

/// Build the waveform described by `cfg`.
pub fn waveform_from_config(cfg: &WaveformConfig) -> PenaltyResult<Box<dyn Waveform>> {
    for (param, value) in [
        ("amplitude", cfg.amplitude),
        ("frequency", cfg.frequency),
        ("phase", cfg.phase),
        ("offset", cfg.offset),
    ] {
        if !value.is_finite() {
            return Err(PenaltyError::NonFinite { kind: cfg.kind, param, value });
        }
    }
    let periodic = || -> PenaltyResult<Periodic> {
        if cfg.frequency <= 0.0 {
            return Err(PenaltyError::BadFrequency { kind: cfg.kind, frequency: cfg.frequency });
        }
        Ok(Periodic::from_config(cfg))
    };
    Ok(match cfg.kind {
        WaveformKind::Null => Box::new(NullWaveform),
        WaveformKind::Constant => Box::new(ConstantWaveform { value: cfg.amplitude + cfg.offset }),
        WaveformKind::Sine => Box::new(SineWaveform(periodic()?)),
        WaveformKind::Square => Box::new(SquareWaveform(periodic()?)),
        WaveformKind::Sawtooth => Box::new(SawtoothWaveform(periodic()?)),
    })
}
