/// Stochastic helpers for the exploration generator.
/// Note: uses `bevy_prng::WyRand` behind a `RefCell` so callers can keep
/// closures shared while mutating RNG state.
use bevy_prng::WyRand;
use rand_core::{RngCore, SeedableRng};
use std::cell::RefCell;

/// Seeded generator; the same seed replays the same draws.
pub fn seeded(seed: u64) -> RefCell<WyRand> {
    RefCell::new(WyRand::from_seed(seed.to_le_bytes()))
}

/// Uniform(0,1) with 53 bits of mantissa.
#[inline]
pub fn uniform01(rng: &RefCell<WyRand>) -> f64 {
    let mut r = rng.borrow_mut();
    ((r.next_u64() >> 11) as f64) / ((1u64 << 53) as f64)
}

/// Uniform index in `0..n`. `n` must be non-zero.
#[inline]
pub fn uniform_index(rng: &RefCell<WyRand>, n: usize) -> usize {
    let u = uniform01(rng);
    ((u * n as f64) as usize).min(n.saturating_sub(1))
}

/// Uniform pick from a non-empty slice.
#[inline]
pub fn pick<T: Copy>(rng: &RefCell<WyRand>, items: &[T]) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    items.get(uniform_index(rng, items.len())).copied()
}
