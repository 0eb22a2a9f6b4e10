//! Seedable random source used throughout training.
//!
//! All randomness in the crate flows through [`Random`]: candidate feature
//! sampling, threshold sampling, and the derivation of per-tree streams.
//! There is no hidden global state; a forest trained from the same seed,
//! data order and parameters is bitwise reproducible.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Deterministic uniform random source.
///
/// Wraps a seeded `Xoshiro256PlusPlus` generator. The trainer gives every
/// tree its own [`Random`] (see [`Random::fork`]) so trees can be trained
/// in parallel without sharing generator state.
#[derive(Debug, Clone)]
pub struct Random {
    rng: Xoshiro256PlusPlus,
}

impl Random {
    /// Create a random source from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// Uniform integer in `[min, max_exclusive)`.
    ///
    /// # Panics
    /// Panics if `min >= max_exclusive`.
    #[inline]
    pub fn next_int(&mut self, min: u32, max_exclusive: u32) -> u32 {
        self.rng.gen_range(min..max_exclusive)
    }

    /// Uniform real in `[0, 1)`.
    #[inline]
    pub fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Derive an independent random source.
    ///
    /// Advances this generator by one draw; the derived source is seeded
    /// from that draw, so repeated forks from the same parent state yield
    /// the same sequence of children.
    pub fn fork(&mut self) -> Random {
        Random::new(self.rng.gen::<u64>())
    }
}
