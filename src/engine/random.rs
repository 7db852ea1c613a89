use rand::seq::SliceRandom;
use rand::Rng;

/// Selection randomness. Implementations must draw uniformly and without
/// replacement; no reproducibility is required.
pub trait RandomSource {
    /// Up to `k` distinct items from `candidates`. When `k` exceeds the
    /// pool, every candidate is returned.
    fn draw(&mut self, candidates: &[i64], k: usize) -> Vec<i64>;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn draw(&mut self, candidates: &[i64], k: usize) -> Vec<i64> {
        candidates.choose_multiple(self, k).copied().collect()
    }
}
