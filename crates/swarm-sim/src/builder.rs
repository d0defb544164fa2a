//! Fluent builder for constructing a [`Swarm`].

use std::collections::{BTreeSet, HashMap};

use swarm_arena::{ArenaMap, HostRegistry, NoopHost, OpKind, interactor_for};
use swarm_core::{ArenaConfig, BlockId, Tick, Vec2z, WaveformConfig};
use swarm_penalty::PenaltyHandler;
use tracing::info;

use crate::{SimError, SimResult, Swarm, SwarmActor};

/// Fluent builder for [`Swarm<A>`].
///
/// # Required inputs
///
/// - [`ArenaConfig`]: grid, blocks, nests, seed
/// - `Vec<A>`: the actors, each with a distinct [`ActorId`][swarm_core::ActorId]
///
/// # Optional inputs (have defaults)
///
/// | Method                 | Default                               |
/// |------------------------|---------------------------------------|
/// | `.waveform(kind, cfg)` | `WaveformKind::Null` (one-tick waits) |
/// | `.host(h)`             | [`NoopHost`]                          |
/// | `.place(block, at)`    | Every block distributed at random     |
/// | `.start_tick(t)`       | `Tick(0)`                             |
/// | `.verify_each_tick(b)` | `false`                               |
///
/// # Example
///
/// ```
/// use swarm_arena::{ForagingActor, OpKind};
/// use swarm_core::{ActorId, ArenaConfig, BlockId, EntityId, Tick, Vec2d, WaveformConfig};
/// use swarm_sim::{NoopObserver, SwarmActor, SwarmBuilder};
///
/// struct Idle(ActorId);
///
/// impl ForagingActor for Idle {
///     fn id(&self) -> ActorId { self.0 }
///     fn position(&self) -> Vec2d { Vec2d::new(0.1, 0.1) }
///     fn acquired_entity(&self) -> Option<EntityId> { None }
///     fn carried_block(&self) -> Option<BlockId> { None }
///     fn wants(&self, _op: OpKind) -> bool { false }
///     fn on_block_pickup(&mut self, _b: BlockId, _t: Tick) {}
///     fn on_block_drop(&mut self, _b: BlockId, _t: Tick) {}
/// }
///
/// impl SwarmActor for Idle {}
///
/// let mut swarm = SwarmBuilder::new(ArenaConfig::default(), vec![Idle(ActorId(0))])
///     .waveform(OpKind::FreeBlockPickup, WaveformConfig::constant(3))
///     .build()
///     .unwrap();
/// swarm.run_ticks(10, &mut NoopObserver).unwrap();
/// assert_eq!(swarm.current_tick(), Tick(10));
/// assert_eq!(swarm.map().free_blocks().len(), 4);
/// ```
pub struct SwarmBuilder<A: SwarmActor> {
    config: ArenaConfig,
    actors: Vec<A>,
    waveforms: HashMap<OpKind, WaveformConfig>,
    host: Option<Box<dyn HostRegistry>>,
    placements: Vec<(BlockId, Vec2z)>,
    start: Tick,
    verify_each_tick: bool,
}

impl<A: SwarmActor> SwarmBuilder<A> {
    /// Create a builder with all required inputs.
    pub fn new(config: ArenaConfig, actors: Vec<A>) -> Self {
        Self {
            config,
            actors,
            waveforms: HashMap::new(),
            host: None,
            placements: Vec::new(),
            start: Tick::ZERO,
            verify_each_tick: false,
        }
    }

    /// Penalty waveform for one operation class.
    pub fn waveform(mut self, kind: OpKind, cfg: WaveformConfig) -> Self {
        self.waveforms.insert(kind, cfg);
        self
    }

    /// The same penalty waveform for every operation class.
    pub fn waveform_all(mut self, cfg: WaveformConfig) -> Self {
        for kind in OpKind::ALL {
            self.waveforms.insert(kind, cfg.clone());
        }
        self
    }

    pub fn host(mut self, host: Box<dyn HostRegistry>) -> Self {
        self.host = Some(host);
        self
    }

    /// Put `block` with its anchor at `at` before the random distribution
    /// fills in the rest.
    pub fn place(mut self, block: BlockId, at: Vec2z) -> Self {
        self.placements.push((block, at));
        self
    }

    pub fn start_tick(mut self, t: Tick) -> Self {
        self.start = t;
        self
    }

    /// Run the full arena consistency check after every tick.  Slow; meant
    /// for tests.
    pub fn verify_each_tick(mut self, on: bool) -> Self {
        self.verify_each_tick = on;
        self
    }

    /// Validate inputs, build the arena and its interactors, distribute the
    /// blocks, and return a ready-to-run [`Swarm`].
    pub fn build(self) -> SimResult<Swarm<A>> {
        // ── Validate ──────────────────────────────────────────────────────
        let mut seen = BTreeSet::new();
        for actor in &self.actors {
            if !seen.insert(actor.id()) {
                return Err(SimError::DuplicateActor(actor.id()));
            }
        }
        let total = self.config.blocks.manifest.total();
        if let Some(&(block, _)) = self.placements.iter().find(|(b, _)| b.index() >= total) {
            return Err(SimError::Config(format!(
                "{block} placed but the manifest holds only {total} blocks"
            )));
        }

        // ── Penalty handlers ──────────────────────────────────────────────
        let interactors = OpKind::ALL
            .into_iter()
            .map(|kind| {
                let cfg = self.waveforms.get(&kind).cloned().unwrap_or_default();
                let handler = PenaltyHandler::from_config(kind.name(), &cfg)?;
                Ok(interactor_for(kind, handler))
            })
            .collect::<SimResult<Vec<_>>>()?;

        // ── Arena ─────────────────────────────────────────────────────────
        let host = self.host.unwrap_or_else(|| Box::new(NoopHost));
        let map = ArenaMap::new(&self.config, host)?;
        for &(block, at) in &self.placements {
            map.place_block_at(block, at)?;
        }
        let placed = map.distribute_all_blocks();

        info!(
            actors = self.actors.len(),
            blocks = total,
            placed,
            fixed = self.placements.len(),
            start = %self.start,
            "swarm built"
        );

        Ok(Swarm {
            map,
            actors: self.actors,
            interactors,
            clock: self.start,
            verify_each_tick: self.verify_each_tick,
        })
    }
}
