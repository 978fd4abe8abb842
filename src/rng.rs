//! Random source seam. Anything implementing `rand::RngCore` is a source; tests seed `StdRng`.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Draws the engine needs. One source belongs to one machine at a time.
pub trait RandomSource {
    /// Uniform float in [0, 1).
    fn uniform(&mut self) -> f64;

    /// Uniform index in [0, len). `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize;

    /// Index drawn from a prepared weight table.
    fn weighted_choice(&mut self, weights: &WeightedIndex<u32>) -> usize;
}

impl<R: RngCore> RandomSource for R {
    #[inline]
    fn uniform(&mut self) -> f64 {
        self.r#gen::<f64>()
    }

    #[inline]
    fn index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }

    #[inline]
    fn weighted_choice(&mut self, weights: &WeightedIndex<u32>) -> usize {
        weights.sample(self)
    }
}

/// Seeded when `seed` is given, otherwise from OS entropy.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}
