//! Unit tests for swarm-penalty.

#[cfg(test)]
mod helpers {
    use swarm_core::{BlockId, EntityId, WaveformConfig};

    use crate::PenaltyHandler;

    pub fn handler(ticks: u64) -> PenaltyHandler {
        PenaltyHandler::from_config("block_pickup", &WaveformConfig::constant(ticks)).unwrap()
    }

    pub fn block(n: u32) -> EntityId {
        EntityId::Block(BlockId(n))
    }
}

#[cfg(test)]
mod waveform {
    use swarm_core::{Tick, WaveformConfig, WaveformKind};

    use crate::{PenaltyError, waveform_from_config};

    fn cfg(kind: WaveformKind) -> WaveformConfig {
        WaveformConfig { kind, amplitude: 4.0, frequency: 0.25, phase: 0.0, offset: 5.0 }
    }

    #[test]
    fn null_and_constant() {
        let null = waveform_from_config(&WaveformConfig::default()).unwrap();
        assert_eq!(null.value(Tick(17)), 0.0);
        let c = waveform_from_config(&WaveformConfig::constant(3)).unwrap();
        assert_eq!(c.value(Tick(0)), 3.0);
        assert_eq!(c.value(Tick(1000)), 3.0);
    }

    #[test]
    fn sine_quarter_periods() {
        // Period of 4 ticks: 5, 9, 5, 1.
        let w = waveform_from_config(&cfg(WaveformKind::Sine)).unwrap();
        let v: Vec<f64> = (0..4).map(|t| w.value(Tick(t))).collect();
        let expected = [5.0, 9.0, 5.0, 1.0];
        for (a, b) in v.iter().zip(expected) {
            assert!((a - b).abs() < 1e-9, "{v:?}");
        }
    }

    #[test]
    fn square_halves() {
        let w = waveform_from_config(&cfg(WaveformKind::Square)).unwrap();
        assert_eq!(w.value(Tick(0)), 9.0);
        assert_eq!(w.value(Tick(1)), 9.0);
        assert_eq!(w.value(Tick(2)), 1.0);
        assert_eq!(w.value(Tick(3)), 1.0);
    }

    #[test]
    fn sawtooth_ramps() {
        let w = waveform_from_config(&cfg(WaveformKind::Sawtooth)).unwrap();
        assert!((w.value(Tick(0)) - 1.0).abs() < 1e-9);
        assert!((w.value(Tick(2)) - 5.0).abs() < 1e-9);
        assert!(w.value(Tick(3)) > w.value(Tick(2)));
    }

    #[test]
    fn rejects_bad_parameters() {
        let mut c = cfg(WaveformKind::Sine);
        c.frequency = 0.0;
        assert!(matches!(waveform_from_config(&c), Err(PenaltyError::BadFrequency { .. })));
        c.frequency = 1.0;
        c.amplitude = f64::INFINITY;
        assert!(matches!(
            waveform_from_config(&c),
            Err(PenaltyError::NonFinite { param: "amplitude", .. })
        ));
    }
}

#[cfg(test)]
mod handler {
    use swarm_core::{ActorId, Tick, WaveformConfig, WaveformKind};

    use super::helpers::{block, handler};
    use crate::PenaltyHandler;

    #[test]
    fn zero_duration_becomes_one() {
        let h = PenaltyHandler::from_config("nest_drop", &WaveformConfig::default()).unwrap();
        assert_eq!(h.penalty_calc(Tick(0)), 1);
        assert_eq!(h.penalty_init(ActorId(0), block(0), Tick(4)), 1);
        assert!(!h.is_penalty_satisfied(ActorId(0), Tick(4)));
        assert!(h.is_penalty_satisfied(ActorId(0), Tick(5)));

        // A caller-supplied zero is bumped too, and still deconflicts.
        assert_eq!(h.penalty_add(ActorId(1), block(1), 0, Tick(7)), 1);
        assert!(!h.is_penalty_satisfied(ActorId(1), Tick(7)));
        assert_eq!(h.penalty_add(ActorId(2), block(2), 0, Tick(7)), 2);
        assert!(h.records().iter().all(|r| r.duration >= 1));
    }

    #[test]
    fn negative_waveform_clamps() {
        let cfg = WaveformConfig {
            kind: WaveformKind::Constant,
            amplitude: -7.5,
            ..WaveformConfig::default()
        };
        let h = PenaltyHandler::from_config("x", &cfg).unwrap();
        assert_eq!(h.penalty_calc(Tick(3)), 1);
    }

    #[test]
    fn fractional_values_floor() {
        let h = PenaltyHandler::from_config("x", &WaveformConfig {
            kind: WaveformKind::Constant,
            amplitude: 2.9,
            ..WaveformConfig::default()
        })
        .unwrap();
        assert_eq!(h.penalty_calc(Tick(0)), 2);
    }

    #[test]
    fn satisfaction_boundary() {
        let h = handler(2);
        assert_eq!(h.penalty_init(ActorId(1), block(0), Tick(5)), 2);
        assert!(h.is_serving_penalty(ActorId(1)));
        assert!(!h.is_penalty_satisfied(ActorId(1), Tick(6)));
        assert!(h.is_penalty_satisfied(ActorId(1), Tick(7)));
        assert!(!h.is_penalty_satisfied(ActorId(2), Tick(7)));
    }

    #[test]
    fn simultaneous_requests_are_separated() {
        let h = handler(3);
        let d0 = h.penalty_init(ActorId(0), block(0), Tick(10));
        let d1 = h.penalty_init(ActorId(1), block(0), Tick(10));
        let d2 = h.penalty_init(ActorId(2), block(1), Tick(10));
        assert_eq!((d0, d1, d2), (3, 4, 5));
    }

    #[test]
    fn uniqueify_restarts_scan() {
        let h = handler(1);
        // Finish ticks 12 and 11 are taken, in that order; a request for 11
        // bumps to 12, which collides with the first record again.
        h.penalty_add(ActorId(0), block(0), 2, Tick(10));
        h.penalty_add(ActorId(1), block(1), 1, Tick(10));
        let d = h.penalty_add(ActorId(2), block(2), 1, Tick(10));
        assert_eq!(d, 3);
        let finishes: Vec<Tick> = h.records().iter().map(|r| r.finish()).collect();
        assert_eq!(finishes, vec![Tick(12), Tick(11), Tick(13)]);
    }

    #[test]
    fn remove_and_abort() {
        let h = handler(2);
        h.penalty_init(ActorId(0), block(0), Tick(0));
        h.penalty_init(ActorId(1), block(1), Tick(0));
        assert_eq!(h.penalty_next().map(|r| r.actor), Some(ActorId(0)));

        let r = h.penalty_remove(ActorId(0));
        assert_eq!(r.id, block(0));
        assert!(!h.is_serving_penalty(ActorId(0)));

        assert!(h.penalty_abort(ActorId(1)).is_some());
        assert!(h.penalty_abort(ActorId(1)).is_none());
        assert!(h.is_empty());
    }

    #[test]
    #[should_panic(expected = "no block_pickup penalty to remove")]
    fn double_remove_is_fatal() {
        let h = handler(2);
        h.penalty_init(ActorId(0), block(0), Tick(0));
        h.penalty_remove(ActorId(0));
        h.penalty_remove(ActorId(0));
    }

    #[test]
    #[should_panic(expected = "already serving")]
    fn second_penalty_for_actor_is_fatal() {
        let h = handler(2);
        h.penalty_init(ActorId(0), block(0), Tick(0));
        h.penalty_init(ActorId(0), block(1), Tick(0));
    }

    #[test]
    fn find_returns_record() {
        let h = handler(4);
        h.penalty_init(ActorId(9), block(3), Tick(2));
        let r = h.penalty_find(ActorId(9)).unwrap();
        assert_eq!((r.start, r.duration, r.finish()), (Tick(2), 4, Tick(6)));
        assert!(h.penalty_find(ActorId(8)).is_none());
    }
}

#[cfg(test)]
mod concurrency {
    use std::collections::HashSet;

    use swarm_core::{ActorId, Tick};

    use super::helpers::{block, handler};

    #[test]
    fn parallel_adds_never_share_a_finish_tick() {
        let h = handler(0);
        std::thread::scope(|s| {
            for i in 0..16u32 {
                let h = &h;
                s.spawn(move || {
                    h.penalty_init(ActorId(i), block(i % 3), Tick(20));
                });
            }
        });
        let finishes: HashSet<Tick> = h.records().iter().map(|r| r.finish()).collect();
        assert_eq!(finishes.len(), 16);
        assert_eq!(h.len(), 16);
    }
}
