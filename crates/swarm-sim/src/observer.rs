//! Swarm observer trait for progress reporting and data collection.

use swarm_arena::ArenaMap;
use swarm_core::Tick;

use crate::stats::TickStats;

/// Callbacks invoked by [`Swarm::run_ticks`][crate::Swarm::run_ticks] at
/// tick boundaries.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: delivery counter
///
/// ```rust,ignore
/// struct Deliveries(usize);
///
/// impl SwarmObserver for Deliveries {
///     fn on_tick_end(&mut self, _tick: Tick, stats: &TickStats, _map: &ArenaMap) {
///         self.0 += stats.nest_drops;
///     }
/// }
/// ```
pub trait SwarmObserver {
    /// Called at the very start of each tick, before zombie caches are
    /// cleared.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once every actor has been stepped.  No locks are held.
    fn on_tick_end(&mut self, _tick: Tick, _stats: &TickStats, _map: &ArenaMap) {}

    /// Called once after [`Swarm::run_until`][crate::Swarm::run_until]
    /// reaches its end tick.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SwarmObserver`] that does nothing.
pub struct NoopObserver;

impl SwarmObserver for NoopObserver {}
