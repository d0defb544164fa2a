//! Unit tests for swarm-sim.

#[cfg(test)]
mod helpers {
    use swarm_arena::{ArenaMap, ForagingActor, OpKind};
    use swarm_core::{
        ActorId, ArenaConfig, BlockDistConfig, BlockId, BlockManifest, EntityId, GridConfig,
        NestConfig, Tick, Vec2d, Vec2z,
    };

    use crate::{SwarmActor, SwarmObserver, TickStats};

    pub const RES: f64 = 0.2;

    /// A 10×10 arena of 0.2 m cells with one nest over cells (7..=8, 7..=8).
    pub fn config(n_cube: usize) -> ArenaConfig {
        ArenaConfig {
            grid: GridConfig { dims: Vec2d::new(2.0, 2.0), resolution: RES },
            blocks: BlockDistConfig {
                manifest: BlockManifest { n_cube, n_ramp: 0, unit_dim: RES },
                ..BlockDistConfig::default()
            },
            nests: vec![NestConfig { center: Vec2d::new(1.6, 1.6), dims: Vec2d::new(0.4, 0.4) }],
            seed: 11,
        }
    }

    pub fn inside(x: usize, y: usize) -> Vec2d {
        Vec2z::new(x, y).cell_center(RES)
    }

    /// Walks to a fixed pickup spot when empty-handed and to the nest when
    /// carrying.
    #[derive(Debug)]
    pub struct Courier {
        pub id: ActorId,
        pub pos: Vec2d,
        pub source: Vec2d,
        pub carried: Option<BlockId>,
        pub delivered: usize,
        pub vanished: usize,
    }

    impl Courier {
        pub fn new(id: u32, source: Vec2d) -> Self {
            Self { id: ActorId(id), pos: source, source, carried: None, delivered: 0, vanished: 0 }
        }
    }

    impl ForagingActor for Courier {
        fn id(&self) -> ActorId {
            self.id
        }

        fn position(&self) -> Vec2d {
            self.pos
        }

        fn acquired_entity(&self) -> Option<EntityId> {
            None
        }

        fn carried_block(&self) -> Option<BlockId> {
            self.carried
        }

        fn wants(&self, op: OpKind) -> bool {
            matches!(
                (self.carried, op),
                (None, OpKind::FreeBlockPickup) | (Some(_), OpKind::NestBlockDrop)
            )
        }

        fn on_block_pickup(&mut self, block: BlockId, _t: Tick) {
            self.carried = Some(block);
        }

        fn on_block_drop(&mut self, _block: BlockId, _t: Tick) {
            self.carried = None;
            self.delivered += 1;
        }

        fn on_block_vanished(&mut self, _block: BlockId) {
            self.vanished += 1;
        }
    }

    impl SwarmActor for Courier {
        fn control_step(&mut self, map: &ArenaMap, _t: Tick) {
            self.pos = match self.carried {
                Some(_) => map.nests()[0].extent().rect.center(),
                None => self.source,
            };
        }
    }

    /// Records every hook call.
    #[derive(Default)]
    pub struct Recorder {
        pub starts: Vec<Tick>,
        pub ends: Vec<(Tick, TickStats)>,
        pub finished: Option<Tick>,
    }

    impl SwarmObserver for Recorder {
        fn on_tick_start(&mut self, tick: Tick) {
            self.starts.push(tick);
        }

        fn on_tick_end(&mut self, tick: Tick, stats: &TickStats, map: &ArenaMap) {
            assert!(map.zombie_caches().is_empty());
            self.ends.push((tick, *stats));
        }

        fn on_sim_end(&mut self, final_tick: Tick) {
            self.finished = Some(final_tick);
        }
    }
}

// ── SwarmBuilder validation ───────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use swarm_arena::{ArenaError, OpKind};
    use swarm_core::{BlockId, CoreError, Tick, Vec2z, WaveformConfig, WaveformKind};
    use swarm_penalty::PenaltyError;

    use super::helpers::{Courier, config, inside};
    use crate::{SimError, SwarmBuilder};

    #[test]
    fn builds_and_distributes_every_block() {
        let swarm = SwarmBuilder::new(config(5), vec![Courier::new(0, inside(1, 1))])
            .build()
            .unwrap();
        assert_eq!(swarm.map().free_blocks().len(), 5);
        assert_eq!(swarm.interactors().len(), OpKind::ALL.len());
        assert_eq!(swarm.current_tick(), Tick(0));
        assert_eq!(swarm.pending_penalties(), 0);
        swarm.map().verify_all();
    }

    #[test]
    fn fixed_placements_are_kept() {
        let swarm = SwarmBuilder::new(config(3), Vec::<Courier>::new())
            .place(BlockId(1), Vec2z::new(2, 5))
            .build()
            .unwrap();
        assert_eq!(swarm.map().robot_on_block(inside(2, 5), None), Some(BlockId(1)));
        assert_eq!(swarm.map().free_blocks().len(), 3);
    }

    #[test]
    fn duplicate_actor_ids_error() {
        let actors = vec![Courier::new(3, inside(1, 1)), Courier::new(3, inside(2, 2))];
        let result = SwarmBuilder::new(config(1), actors).build();
        assert!(matches!(result, Err(SimError::DuplicateActor(id)) if id.0 == 3));
    }

    #[test]
    fn placement_outside_manifest_errors() {
        let result = SwarmBuilder::new(config(2), Vec::<Courier>::new())
            .place(BlockId(2), Vec2z::new(1, 1))
            .build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn bad_waveform_errors() {
        let sine = WaveformConfig { kind: WaveformKind::Sine, amplitude: 1.0, ..WaveformConfig::default() };
        let result = SwarmBuilder::new(config(1), Vec::<Courier>::new())
            .waveform(OpKind::CacheBlockDrop, sine)
            .build();
        assert!(matches!(result, Err(SimError::Penalty(PenaltyError::BadFrequency { .. }))));
    }

    #[test]
    fn invalid_arena_config_errors() {
        let mut cfg = config(1);
        cfg.grid.resolution = 0.0;
        let result = SwarmBuilder::new(cfg, Vec::<Courier>::new()).build();
        assert!(matches!(result, Err(SimError::Arena(ArenaError::Core(CoreError::Config(_))))));
    }

    #[test]
    fn start_tick_and_waveforms_apply() {
        let swarm = SwarmBuilder::new(config(1), Vec::<Courier>::new())
            .waveform_all(WaveformConfig::constant(4))
            .start_tick(Tick(50))
            .build()
            .unwrap();
        assert_eq!(swarm.current_tick(), Tick(50));
        for i in swarm.interactors() {
            assert_eq!(i.handler().penalty_calc(Tick(50)), 4);
        }
    }
}

// ── Tick loop ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tick_loop {
    use swarm_core::{BlockId, Tick, Vec2z, WaveformConfig};

    use super::helpers::{Courier, Recorder, config, inside};
    use crate::{NoopObserver, SimError, SwarmBuilder};

    #[test]
    fn courier_delivers_one_block() {
        let mut swarm = SwarmBuilder::new(config(1), vec![Courier::new(0, inside(3, 3))])
            .place(BlockId(0), Vec2z::new(3, 3))
            .verify_each_tick(true)
            .build()
            .unwrap();

        // 0: pickup penalty, 1: pickup, 2: nest penalty, 3: delivery.
        let total = swarm.run_ticks(4, &mut NoopObserver).unwrap();
        assert_eq!(total.started, 2);
        assert_eq!(total.pickups, 1);
        assert_eq!(total.nest_drops, 1);
        assert_eq!(total.committed(), 2);
        assert_eq!(swarm.actors()[0].delivered, 1);
        assert_eq!(swarm.actors()[0].carried, None);
        assert_eq!(swarm.pending_penalties(), 0);

        // The delivered block went straight back into the arena.
        assert!(swarm.map().blocks().block(BlockId(0)).is_free());
    }

    #[test]
    fn penalty_length_delays_commit() {
        let mut swarm = SwarmBuilder::new(config(1), vec![Courier::new(0, inside(3, 3))])
            .place(BlockId(0), Vec2z::new(3, 3))
            .waveform_all(WaveformConfig::constant(3))
            .build()
            .unwrap();

        let total = swarm.run_ticks(3, &mut NoopObserver).unwrap();
        assert_eq!(total.started, 1);
        assert_eq!(total.waiting, 2);
        assert_eq!(total.pickups, 0);
        assert_eq!(swarm.pending_penalties(), 1);

        let total = swarm.run_ticks(1, &mut NoopObserver).unwrap();
        assert_eq!(total.pickups, 1);
        assert_eq!(swarm.actors()[0].carried, Some(BlockId(0)));
    }

    #[test]
    fn same_tick_race_leaves_one_winner() {
        let actors = vec![Courier::new(0, inside(3, 3)), Courier::new(1, inside(3, 3))];
        let mut swarm = SwarmBuilder::new(config(1), actors)
            .place(BlockId(0), Vec2z::new(3, 3))
            .verify_each_tick(true)
            .build()
            .unwrap();

        // Both start at 0; the second penalty is pushed one tick later, so
        // one actor commits at 1 and the other finds nothing at 2.
        let total = swarm.run_ticks(3, &mut NoopObserver).unwrap();
        assert_eq!(total.pickups, 1);
        assert_eq!(total.vanished, 1);
        let carriers = swarm.actors().iter().filter(|a| a.carried.is_some()).count();
        assert_eq!(carriers, 1);
        let vanished: usize = swarm.actors().iter().map(|a| a.vanished).sum();
        assert_eq!(vanished, 1);
    }

    #[test]
    fn observer_sees_every_tick() {
        let mut swarm = SwarmBuilder::new(config(1), vec![Courier::new(0, inside(3, 3))])
            .place(BlockId(0), Vec2z::new(3, 3))
            .start_tick(Tick(10))
            .build()
            .unwrap();

        let mut rec = Recorder::default();
        swarm.run_until(Tick(14), &mut rec).unwrap();
        assert_eq!(rec.starts, vec![Tick(10), Tick(11), Tick(12), Tick(13)]);
        assert_eq!(rec.ends.len(), 4);
        assert_eq!(rec.ends[0].1.started, 1);
        assert_eq!(rec.ends[1].1.pickups, 1);
        assert_eq!(rec.finished, Some(Tick(14)));
        assert_eq!(swarm.current_tick(), Tick(14));

        // Already at the end tick: nothing runs.
        let total = swarm.run_until(Tick(14), &mut rec).unwrap();
        assert_eq!(total.committed(), 0);
        assert_eq!(rec.starts.len(), 4);

        // An end tick in the past is refused without running anything.
        let err = swarm.run_until(Tick(12), &mut rec).unwrap_err();
        assert!(matches!(err, SimError::EndInPast { end: Tick(12), now: Tick(14) }));
        assert_eq!(rec.starts.len(), 4);
        assert_eq!(swarm.current_tick(), Tick(14));
    }

    #[test]
    fn many_couriers_keep_the_arena_consistent() {
        let actors = (0..6u32)
            .map(|i| {
                let i = i as usize;
                Courier::new(i as u32, inside(1 + (i % 3) * 2, 1 + (i / 3) * 3))
            })
            .collect();
        let mut swarm = SwarmBuilder::new(config(8), actors)
            .verify_each_tick(true)
            .build()
            .unwrap();
        swarm.run_ticks(40, &mut NoopObserver).unwrap();
        let blocks = swarm.map().blocks();
        let carried = swarm.actors().iter().filter(|a| a.carried.is_some()).count();
        assert_eq!(blocks.free_blocks().len() + carried, 8);
    }
}

// ── TickStats ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod stats {
    use swarm_arena::{InteractorStatus, OpOutcome};
    use swarm_core::{BlockId, CacheId, Vec2z};

    use crate::TickStats;

    #[test]
    fn record_classifies_outcomes() {
        let mut s = TickStats::default();
        s.record(&InteractorStatus::NoEvent);
        s.record(&InteractorStatus::PenaltyStarted { duration: 2 });
        s.record(&InteractorStatus::Waiting);
        s.record(&InteractorStatus::Aborted);
        s.record(&InteractorStatus::Finished(OpOutcome::CachedBlockPickedUp {
            block: BlockId(1),
            cache: CacheId(0),
            depleted: true,
        }));
        s.record(&InteractorStatus::Finished(OpOutcome::DropConflict {
            block: BlockId(2),
            at: Vec2z::new(1, 1),
        }));
        s.record(&InteractorStatus::Finished(OpOutcome::CacheVanished { cache: CacheId(0) }));

        assert_eq!(s.started, 1);
        assert_eq!(s.waiting, 1);
        assert_eq!(s.aborted, 1);
        assert_eq!(s.pickups, 1);
        assert_eq!(s.depletions, 1);
        assert_eq!(s.conflicts, 1);
        assert_eq!(s.vanished, 1);
        assert_eq!(s.committed(), 1);
    }

    #[test]
    fn merge_adds_fields() {
        let a = TickStats { drops: 2, nest_drops: 1, ..TickStats::default() };
        let b = TickStats { drops: 1, waiting: 4, ..TickStats::default() };
        let m = a.merge(b);
        assert_eq!(m.drops, 3);
        assert_eq!(m.waiting, 4);
        assert_eq!(m.committed(), 4);
    }
}
