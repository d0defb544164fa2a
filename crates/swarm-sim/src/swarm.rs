//! The `Swarm` struct and its tick loop.

use swarm_arena::{ArenaMap, ForagingActor, Interactor, InteractorStatus};
use swarm_core::Tick;
use tracing::{debug, trace};

use crate::{SimError, SimResult, SwarmObserver, TickStats};

/// A [`ForagingActor`] the swarm can drive.
///
/// `control_step` runs once per tick before the actor is offered to the
/// interactors; it is where a controller moves the robot and decides what it
/// wants.  It only gets a shared view of the arena.
pub trait SwarmActor: ForagingActor + Send {
    fn control_step(&mut self, _map: &ArenaMap, _t: Tick) {}
}

/// The tick runner.
///
/// Each tick:
///
/// 1. **Zombies**: caches removed during the previous tick are released.
/// 2. **Control** (optionally parallel with the `parallel` feature): every
///    actor's [`SwarmActor::control_step`] runs.
/// 3. **Interact**: the same actor is offered to each interactor in turn
///    and stops at the first one that reports anything but
///    [`InteractorStatus::NoEvent`], so an actor engages in one operation
///    class at a time.
///
/// Create via [`SwarmBuilder`][crate::SwarmBuilder].
pub struct Swarm<A: SwarmActor> {
    pub(crate) map: ArenaMap,
    pub(crate) actors: Vec<A>,
    pub(crate) interactors: Vec<Box<dyn Interactor>>,
    pub(crate) clock: Tick,
    pub(crate) verify_each_tick: bool,
}

impl<A: SwarmActor> Swarm<A> {
    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn map(&self) -> &ArenaMap {
        &self.map
    }

    #[inline]
    pub fn actors(&self) -> &[A] {
        &self.actors
    }

    #[inline]
    pub fn actors_mut(&mut self) -> &mut [A] {
        &mut self.actors
    }

    #[inline]
    pub fn interactors(&self) -> &[Box<dyn Interactor>] {
        &self.interactors
    }

    /// The tick the next call to `run_ticks` starts at.
    #[inline]
    pub fn current_tick(&self) -> Tick {
        self.clock
    }

    /// Penalties currently held across all interactors.
    pub fn pending_penalties(&self) -> usize {
        self.interactors.iter().map(|i| i.handler().len()).sum()
    }

    // ── Running ───────────────────────────────────────────────────────────

    /// Run exactly `n` ticks from the current tick.
    ///
    /// Arena invariant violations panic rather than return, so this
    /// currently always succeeds; it returns `SimResult` like `run_until`.
    pub fn run_ticks<O: SwarmObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<TickStats> {
        let mut total = TickStats::default();
        for _ in 0..n {
            total += self.tick(observer);
        }
        Ok(total)
    }

    /// Run until the clock reaches `end`, then call
    /// [`SwarmObserver::on_sim_end`].
    ///
    /// An `end` earlier than the current tick is an error and runs nothing.
    pub fn run_until<O: SwarmObserver>(&mut self, end: Tick, observer: &mut O) -> SimResult<TickStats> {
        if end < self.clock {
            return Err(SimError::EndInPast { end, now: self.clock });
        }
        let n = end.since(self.clock);
        let total = self.run_ticks(n, observer)?;
        observer.on_sim_end(self.clock);
        Ok(total)
    }

    fn tick<O: SwarmObserver>(&mut self, observer: &mut O) -> TickStats {
        let now = self.clock;
        observer.on_tick_start(now);
        self.map.update(now);

        let stats = self.step_actors(now);
        if stats != TickStats::default() {
            debug!(tick = %now, %stats, "tick");
        }
        if self.verify_each_tick {
            self.map.verify_all();
        }

        observer.on_tick_end(now, &stats, &self.map);
        self.clock = now.next();
        stats
    }

    fn step_actors(&mut self, now: Tick) -> TickStats {
        // Explicit field borrows so the borrow checker sees disjoint access.
        let map = &self.map;
        let interactors = self.interactors.as_slice();

        #[cfg(not(feature = "parallel"))]
        {
            self.actors
                .iter_mut()
                .map(|actor| step_actor(map, interactors, actor, now))
                .fold(TickStats::default(), TickStats::merge)
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            self.actors
                .par_iter_mut()
                .map(|actor| step_actor(map, interactors, actor, now))
                .reduce(TickStats::default, TickStats::merge)
        }
    }
}

/// Control phase, then interactors until one of them engages.
fn step_actor<A: SwarmActor>(
    map: &ArenaMap,
    interactors: &[Box<dyn Interactor>],
    actor: &mut A,
    now: Tick,
) -> TickStats {
    actor.control_step(map, now);
    let mut stats = TickStats::default();
    for interactor in interactors {
        let status = interactor.step(map, actor, now);
        if status == InteractorStatus::NoEvent {
            continue;
        }
        trace!(actor = %actor.id(), handler = interactor.handler().name(), ?status, "interacted");
        stats.record(&status);
        break;
    }
    stats
}
