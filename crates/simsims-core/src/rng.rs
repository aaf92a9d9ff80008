//! Randomness for accidents, poisoning and worker top-ups.
//!
//! The economy owns one master generator and hands every production cycle
//! its own generator seeded from it, so a seeded economy makes the same draws
//! per cycle even though cycles interleave nondeterministically.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Generator type used by the economy and its production cycles.
pub type SimRng = SmallRng;

/// A generator seeded from `seed`, or from OS entropy when absent.
pub fn seeded(seed: Option<u64>) -> SimRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}

/// Derive an independent generator for one production cycle.
pub fn fork(master: &mut SimRng) -> SimRng {
    SmallRng::seed_from_u64(master.r#gen())
}

/// Returns `true` with the given probability.
///
/// - probability <= 0 always returns false
/// - probability >= 1 always returns true
pub fn chance<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    if probability <= 0.0 {
        return false;
    }
    if probability >= 1.0 {
        return true;
    }
    rng.r#gen::<f64>() < probability
}
