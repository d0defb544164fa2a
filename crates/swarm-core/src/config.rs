//! Plain configuration structures, consumed once at construction time.
//!
//! Parsing these from a file format is the host's job; with the `serde`
//! feature enabled every struct here derives `Serialize`/`Deserialize`.

use crate::error::{CoreError, CoreResult};
use crate::geo::{RealRect, Vec2d, cells_for};

/// Default retry budget for a single random block placement.
pub const DEFAULT_MAX_DIST_TRIES: usize = 1000;

// ── GridConfig ────────────────────────────────────────────────────────────────

/// Arena extent and the size of one grid cell.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridConfig {
    /// Real arena dimensions in metres.
    pub dims: Vec2d,
    /// Cell edge length in metres.
    pub resolution: f64,
}

impl GridConfig {
    pub fn xdsize(&self) -> usize {
        cells_for(self.dims.x, self.resolution)
    }

    pub fn ydsize(&self) -> usize {
        cells_for(self.dims.y, self.resolution)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { dims: Vec2d::new(2.0, 2.0), resolution: 0.2 }
    }
}

// ── Blocks ────────────────────────────────────────────────────────────────────

/// How many blocks of each kind the arena holds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockManifest {
    pub n_cube: usize,
    pub n_ramp: usize,
    /// Edge length of a cube block; ramps are twice as long in x.
    pub unit_dim: f64,
}

impl BlockManifest {
    #[inline]
    pub fn total(&self) -> usize {
        self.n_cube + self.n_ramp
    }
}

impl Default for BlockManifest {
    fn default() -> Self {
        Self { n_cube: 4, n_ramp: 0, unit_dim: 0.2 }
    }
}

/// Layout of the block source regions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistType {
    /// One distributor over the whole arena interior.
    #[default]
    Random,
    /// One cluster at the far end of the arena from the nest.
    SingleSource,
    /// Two clusters at opposite ends.
    DualSource,
    /// Four clusters, one per side.
    QuadSource,
}

impl DistType {
    /// Number of clusters this layout creates (0 for `Random`).
    pub fn n_clusters(self) -> usize {
        match self {
            DistType::Random => 0,
            DistType::SingleSource => 1,
            DistType::DualSource => 2,
            DistType::QuadSource => 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockDistConfig {
    pub dist_type: DistType,
    pub manifest: BlockManifest,
    /// Maximum samples per placement before reporting exhaustion.
    pub max_dist_tries: usize,
    /// Per-cluster capacity; `None` means "as many blocks as the region
    /// has cells".
    pub cluster_capacity: Option<usize>,
    /// Batch policy for the initial distribution.
    pub strict_success: bool,
}

impl Default for BlockDistConfig {
    fn default() -> Self {
        Self {
            dist_type: DistType::Random,
            manifest: BlockManifest::default(),
            max_dist_tries: DEFAULT_MAX_DIST_TRIES,
            cluster_capacity: None,
            strict_success: true,
        }
    }
}

// ── Nests ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NestConfig {
    pub center: Vec2d,
    pub dims: Vec2d,
}

impl NestConfig {
    pub fn rect(&self) -> RealRect {
        RealRect::from_center(self.center, self.dims)
    }
}

// ── Waveforms ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WaveformKind {
    /// Always 0 (penalties still last one tick).
    #[default]
    Null,
    Constant,
    Sine,
    Square,
    Sawtooth,
}

/// Parameters of a periodic penalty-duration function of the tick.
///
/// `value(t) = amplitude · shape(frequency · t + phase) + offset`
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaveformConfig {
    pub kind: WaveformKind,
    pub amplitude: f64,
    /// Cycles per tick.
    pub frequency: f64,
    /// Phase shift in radians.
    pub phase: f64,
    pub offset: f64,
}

impl WaveformConfig {
    /// A constant waveform returning `ticks`.
    pub fn constant(ticks: u64) -> Self {
        Self {
            kind: WaveformKind::Constant,
            amplitude: ticks as f64,
            ..Self::default()
        }
    }
}

// ── ArenaConfig ───────────────────────────────────────────────────────────────

/// Everything needed to construct an arena map.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArenaConfig {
    pub grid: GridConfig,
    pub blocks: BlockDistConfig,
    pub nests: Vec<NestConfig>,
    /// Seed for the arena RNG.
    pub seed: u64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            blocks: BlockDistConfig::default(),
            nests: Vec::new(),
            seed: 0,
        }
    }
}

impl ArenaConfig {
    /// Reject configurations the arena cannot be built from.
    pub fn validate(&self) -> CoreResult<()> {
        let grid = &self.grid;
        if !(grid.resolution > 0.0) {
            return Err(CoreError::Config(format!(
                "grid resolution must be positive, got {}",
                grid.resolution
            )));
        }
        if grid.dims.x < grid.resolution || grid.dims.y < grid.resolution {
            return Err(CoreError::Config(format!(
                "arena dims {} smaller than one cell of {}",
                grid.dims, grid.resolution
            )));
        }
        let manifest = &self.blocks.manifest;
        if !(manifest.unit_dim > 0.0) {
            return Err(CoreError::Config(format!(
                "block unit dim must be positive, got {}",
                manifest.unit_dim
            )));
        }
        if self.blocks.max_dist_tries == 0 {
            return Err(CoreError::Config("max_dist_tries must be at least 1".into()));
        }
        if self.blocks.cluster_capacity == Some(0) {
            return Err(CoreError::Config("cluster capacity must be at least 1".into()));
        }
        let arena = RealRect::from_anchor(Vec2d::default(), grid.dims);
        for (i, nest) in self.nests.iter().enumerate() {
            let r = nest.rect();
            if !(arena.contains(Vec2d::new(r.x.lb, r.y.lb))
                && arena.contains(Vec2d::new(r.x.ub, r.y.ub)))
            {
                return Err(CoreError::Config(format!(
                    "nest {i} at {} with dims {} lies outside the arena",
                    nest.center, nest.dims
                )));
            }
            if let Some(j) = self.nests[..i].iter().position(|other| other.rect().overlaps(&r)) {
                return Err(CoreError::Config(format!("nests {j} and {i} overlap")));
            }
        }
        Ok(())
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

impl std::str::FromStr for DistType {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "random" => Ok(DistType::Random),
            "single_source" => Ok(DistType::SingleSource),
            "dual_source" => Ok(DistType::DualSource),
            "quad_source" => Ok(DistType::QuadSource),
            other => Err(CoreError::Parse(format!("unknown distribution type '{other}'"))),
        }
    }
}

impl std::str::FromStr for WaveformKind {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "null" => Ok(WaveformKind::Null),
            "constant" => Ok(WaveformKind::Constant),
            "sine" => Ok(WaveformKind::Sine),
            "square" => Ok(WaveformKind::Square),
            "sawtooth" => Ok(WaveformKind::Sawtooth),
            other => Err(CoreError::Parse(format!("unknown waveform '{other}'"))),
        }
    }
}
