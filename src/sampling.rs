//! Injectable randomness for backend skipping and low-impact sampling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniformly distributed numbers in `[0, 1)`.
pub trait RandomSource: Send {
    /// Returns the next number in `[0, 1)`.
    fn next_f64(&mut self) -> f64;
}

/// [`RandomSource`] backed by [`StdRng`].
pub struct SeededRandom(StdRng);

impl SeededRandom {
    /// Deterministic source; the same seed yields the same decisions.
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Source seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Returns true with probability `probability`.
///
/// `0.0` never fires and `1.0` always fires.
pub fn chance(rng: &mut dyn RandomSource, probability: f64) -> bool {
    rng.next_f64() < probability
}

/// Replays a fixed sequence of values, then repeats the last one.
#[cfg(test)]
pub(crate) struct ScriptedRandom {
    values: Vec<f64>,
    next: usize,
}

#[cfg(test)]
impl ScriptedRandom {
    pub(crate) fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            next: 0,
        }
    }

    /// Number of values drawn so far.
    pub(crate) fn draws(&self) -> usize {
        self.next
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        let value = self
            .values
            .get(self.next)
            .or_else(|| self.values.last())
            .copied()
            .unwrap_or(0.0);
        self.next += 1;
        value
    }
}
