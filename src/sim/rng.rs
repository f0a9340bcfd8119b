//! Seeded randomness for the simulation
//!
//! Every gameplay decision (spawn rolls, pattern choice, crits, drops) is
//! drawn from one `Pcg32` so a run is reproducible from its seed. Particles
//! and effects own separate generators.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Seeded RNG owned by the game state
#[derive(Debug, Clone)]
pub struct SimRng {
    rng: Pcg32,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Uniform value in [0, 1)
    pub fn unit(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Uniform value in [lo, hi); returns `lo` for an empty range
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        lo + (hi - lo) * self.unit()
    }

    /// Uniform value in [-half, half)
    pub fn spread(&mut self, half: f32) -> f32 {
        self.range(-half, half)
    }

    /// Bernoulli roll: true with probability `p`
    pub fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }

    /// Uniform angle in [0, 2π)
    pub fn angle(&mut self) -> f32 {
        self.unit() * std::f32::consts::TAU
    }

    /// Uniform index in [0, len); 0 for an empty range
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.random_range(0..len)
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let i = self.index(items.len());
        items.get(i)
    }

    /// Cumulative-sum sampling over `weights`
    ///
    /// Weights need not sum to one; the roll is scaled by their total. Returns
    /// `None` when the table is empty or has no positive weight.
    pub fn weighted(&mut self, weights: &[f32]) -> Option<usize> {
        let total: f32 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }
        let roll = self.unit() * total;
        let mut acc = 0.0;
        let mut last = None;
        for (i, w) in weights.iter().enumerate() {
            if *w <= 0.0 {
                continue;
            }
            acc += w;
            last = Some(i);
            if roll < acc {
                return Some(i);
            }
        }
        // Float rounding can leave roll == total
        last
    }

    /// Draw a fresh seed (used when restarting a run)
    pub fn next_seed(&mut self) -> u64 {
        self.rng.random::<u64>()
    }
}
