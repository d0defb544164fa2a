//! xsmall — smallest runnable swarm foraging arena.
//!
//! Twelve random-walking foragers on a 4 m × 4 m arena with two block
//! clusters and a central nest.  A forager that walks over a free block stops,
//! serves the pickup penalty, and heads straight for the nest; delivered
//! blocks are redistributed into the clusters.
//!
//! Set `RUST_LOG=debug` to watch individual commits.

use std::time::Instant;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use swarm_arena::{ArenaMap, ForagingActor, OpKind};
use swarm_core::{
    ActorId, ArenaConfig, ArenaRng, BlockDistConfig, BlockId, BlockManifest, DistType, EntityId,
    GridConfig, NestConfig, Tick, Vec2d, WaveformConfig, WaveformKind,
};
use swarm_sim::{SwarmActor, SwarmBuilder, SwarmObserver, TickStats};

// ── Constants ─────────────────────────────────────────────────────────────────

const ROBOT_COUNT: u32 = 12;
const SEED: u64 = 42;
const ARENA_DIM: f64 = 4.0;
const RESOLUTION: f64 = 0.2;
const TOTAL_TICKS: u64 = 2_000;
const LOG_INTERVAL_TICKS: u64 = 250;
/// Distance covered per tick, in metres.
const STEP: f64 = 0.08;

// ── Forager ───────────────────────────────────────────────────────────────────

struct Forager {
    id: ActorId,
    pos: Vec2d,
    heading: f64,
    rng: ArenaRng,
    carried: Option<BlockId>,
    on_block: bool,
    in_nest: bool,
    delivered: usize,
    lost: usize,
}

impl Forager {
    fn new(id: u32, pos: Vec2d, mut rng: ArenaRng) -> Self {
        let heading = rng.gen_range(0.0..std::f64::consts::TAU);
        Self {
            id: ActorId(id),
            pos,
            heading,
            rng,
            carried: None,
            on_block: false,
            in_nest: false,
            delivered: 0,
            lost: 0,
        }
    }

    fn advance(&mut self, dx: f64, dy: f64) {
        let lo = RESOLUTION / 2.0;
        let hi = ARENA_DIM - RESOLUTION / 2.0;
        let (x, y) = (self.pos.x + dx, self.pos.y + dy);
        if !(lo..hi).contains(&x) || !(lo..hi).contains(&y) {
            self.heading += std::f64::consts::PI;
        }
        self.pos = Vec2d::new(x.clamp(lo, hi), y.clamp(lo, hi));
    }

    fn wander(&mut self) {
        self.heading += self.rng.gen_range(-0.6..0.6);
        self.advance(STEP * self.heading.cos(), STEP * self.heading.sin());
    }

    fn home_in(&mut self, target: Vec2d) {
        let (dx, dy) = (target.x - self.pos.x, target.y - self.pos.y);
        let d = self.pos.distance(target);
        if d <= STEP {
            self.pos = target;
        } else {
            self.advance(STEP * dx / d, STEP * dy / d);
        }
    }
}

impl ForagingActor for Forager {
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
        match op {
            OpKind::FreeBlockPickup => self.carried.is_none() && self.on_block,
            OpKind::NestBlockDrop => self.carried.is_some() && self.in_nest,
            _ => false,
        }
    }

    fn on_block_pickup(&mut self, block: BlockId, _t: Tick) {
        self.carried = Some(block);
        self.on_block = false;
    }

    fn on_block_drop(&mut self, _block: BlockId, _t: Tick) {
        self.carried = None;
        self.in_nest = false;
        self.delivered += 1;
    }

    fn on_block_vanished(&mut self, _block: BlockId) {
        self.on_block = false;
        self.lost += 1;
    }
}

impl SwarmActor for Forager {
    fn control_step(&mut self, map: &ArenaMap, _t: Tick) {
        match self.carried {
            Some(_) => {
                self.in_nest = map.nest_at(self.pos).is_some();
                if !self.in_nest {
                    self.home_in(map.nests()[0].extent().rect.center());
                }
            }
            None => {
                self.on_block = map.robot_on_block(self.pos, None).is_some();
                if !self.on_block {
                    self.wander();
                }
            }
        }
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct ProgressLog {
    totals: TickStats,
}

impl SwarmObserver for ProgressLog {
    fn on_tick_end(&mut self, tick: Tick, stats: &TickStats, map: &ArenaMap) {
        self.totals += *stats;
        if tick.0 > 0 && tick.0 % LOG_INTERVAL_TICKS == 0 {
            info!(
                %tick,
                free = map.free_blocks().len(),
                delivered = self.totals.nest_drops,
                vanished = self.totals.vanished,
                "progress"
            );
        }
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        info!(%final_tick, totals = %self.totals, "done");
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    println!("=== xsmall — swarm foraging arena ===");
    println!("Robots: {ROBOT_COUNT}  |  Ticks: {TOTAL_TICKS}  |  Seed: {SEED}");
    println!();

    // 1. Arena: two clusters on the left and right, the nest in the middle.
    let config = ArenaConfig {
        grid: GridConfig { dims: Vec2d::new(ARENA_DIM, ARENA_DIM), resolution: RESOLUTION },
        blocks: BlockDistConfig {
            dist_type: DistType::DualSource,
            manifest: BlockManifest { n_cube: 12, n_ramp: 4, unit_dim: RESOLUTION },
            ..BlockDistConfig::default()
        },
        nests: vec![NestConfig {
            center: Vec2d::new(ARENA_DIM / 2.0, ARENA_DIM / 2.0),
            dims: Vec2d::new(0.6, 0.6),
        }],
        seed: SEED,
    };

    // 2. Robots start spread around the nest.
    let mut root = ArenaRng::new(SEED);
    let robots: Vec<Forager> = (0..ROBOT_COUNT)
        .map(|i| {
            let a = f64::from(i) / f64::from(ROBOT_COUNT) * std::f64::consts::TAU;
            let c = ARENA_DIM / 2.0;
            Forager::new(i, Vec2d::new(c + 0.6 * a.cos(), c + 0.6 * a.sin()), root.child(u64::from(i)))
        })
        .collect();

    // 3. Pickups alternate between 9 and 1 ticks every 100 ticks; nest drops cost 3.
    let pickup = WaveformConfig {
        kind: WaveformKind::Square,
        amplitude: 4.0,
        frequency: 0.005,
        phase: 0.0,
        offset: 5.0,
    };
    let mut swarm = SwarmBuilder::new(config, robots)
        .waveform(OpKind::FreeBlockPickup, pickup)
        .waveform(OpKind::NestBlockDrop, WaveformConfig::constant(3))
        .build()?;
    println!("Initial free blocks: {}", swarm.map().free_blocks().len());

    // 4. Run.
    let t0 = Instant::now();
    let mut log = ProgressLog::default();
    swarm.run_until(Tick(TOTAL_TICKS), &mut log)?;
    let elapsed = t0.elapsed();
    swarm.map().verify_all();

    // 5. Summary.
    println!();
    println!("Simulated {TOTAL_TICKS} ticks in {:.1} ms", elapsed.as_secs_f64() * 1e3);
    println!("Totals: {}", log.totals);
    println!();
    println!("{:>6}  {:>9}  {:>6}", "robot", "delivered", "lost");
    for r in swarm.actors() {
        println!("{:>6}  {:>9}  {:>6}", r.id.0, r.delivered, r.lost);
    }
    Ok(())
}
