//! Deterministic, explicitly injected RNG.
//!
//! There is no process-wide RNG.  The arena map owns one `ArenaRng` for block
//! distribution and hands it to distributors by `&mut`; anything else that
//! needs randomness derives a child with [`ArenaRng::child`].

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Arena-level RNG for distribution and other global operations.
///
/// Used only in single-threaded or explicitly synchronised contexts (the
/// arena map keeps it behind a `Mutex`).
pub struct ArenaRng(SmallRng);

impl ArenaRng {
    pub fn new(seed: u64) -> Self {
        ArenaRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child RNG with a different seed offset, for giving a
    /// worker its own deterministic stream.
    pub fn child(&mut self, offset: u64) -> ArenaRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        ArenaRng(SmallRng::seed_from_u64(child_seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }
}
