//! Seed derivation and log-scale sampling.
//!
//! Every solver takes an explicit `u64` seed and builds its generator with
//! [`u_numflow::random::create_rng`]. Parallel trials derive their own seeds
//! from it so results do not depend on thread scheduling.

use rand::Rng;
use u_numflow::distributions::Uniform;

/// Derives the seed of trial `index` from a base seed (one SplitMix64 step).
///
/// # Examples
///
/// ```
/// use rand::Rng;
/// use td_routing::random::derive_seed;
/// use u_numflow::random::create_rng;
///
/// let a: u64 = create_rng(derive_seed(7, 0)).random();
/// let b: u64 = create_rng(derive_seed(7, 0)).random();
/// assert_eq!(a, b);
/// assert_ne!(derive_seed(7, 0), derive_seed(7, 1));
/// ```
pub fn derive_seed(base: u64, index: u64) -> u64 {
    let mut z = base
        .wrapping_add(index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Samples log-uniformly from `[lo, hi]`.
///
/// Falls back to `lo` when the range is empty or not strictly positive.
pub fn log_uniform<R: Rng>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if lo <= 0.0 {
        return lo;
    }
    let Ok(exponent) = Uniform::new(lo.ln(), hi.ln()) else {
        return lo;
    };
    exponent
        .quantile(rng.random::<f64>())
        .map_or(lo, f64::exp)
        .clamp(lo, hi)
}

/// Samples an integer log-uniformly from `[lo, hi]`.
pub fn log_uniform_usize<R: Rng>(rng: &mut R, lo: usize, hi: usize) -> usize {
    let lo = lo.max(1);
    if hi <= lo {
        return lo;
    }
    let v = log_uniform(rng, lo as f64, hi as f64 + 1.0).floor() as usize;
    v.clamp(lo, hi)
}
