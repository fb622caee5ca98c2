//! Random selection for challenge generation
//!
//! Generation picks tables and columns through [`RandomSource`] so callers
//! can swap in a seeded or fully scripted source and get reproducible
//! challenges.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform index choices
pub trait RandomSource: Send {
    /// Return an index in `0..len`. `len` is never zero.
    fn pick_index(&mut self, len: usize) -> usize;
}

/// Pick one element of a slice, `None` when it is empty
pub fn choose<'a, T>(rng: &mut dyn RandomSource, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    let index = rng.pick_index(items.len()).min(items.len() - 1);
    items.get(index)
}

/// `StdRng`-backed source, optionally seeded
#[derive(Debug)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Deterministic source for a given seed
    pub fn from_seed(seed: u64) -> Self {
        SeededRandom { rng: StdRng::seed_from_u64(seed) }
    }

    /// Source seeded from OS entropy
    pub fn from_entropy() -> Self {
        SeededRandom { rng: StdRng::from_entropy() }
    }

    /// Seeded when a seed is given, entropy otherwise
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Source that replays a fixed sequence of picks, cycling when exhausted.
///
/// Each pick is reduced modulo the requested length.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    picks: Vec<usize>,
    position: usize,
}

impl ScriptedRandom {
    /// Create a scripted source
    pub fn new(picks: Vec<usize>) -> Self {
        ScriptedRandom { picks, position: 0 }
    }
}

impl RandomSource for ScriptedRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        if self.picks.is_empty() {
            return 0;
        }
        let pick = self.picks[self.position % self.picks.len()];
        self.position += 1;
        pick % len
    }
}
