//! Injectable randomness for variant selection.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Picks an index uniformly from `0..len`.
///
/// Callers never pass `len == 0`; pools are non-empty by construction.
pub trait RandomSource: Send + Sync {
    fn pick(&self, len: usize) -> usize;
}

/// Thread-local OS-seeded RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Reproducible RNG from a fixed seed.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick(&self, len: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());
        rng.gen_range(0..len)
    }
}

/// Replays a fixed index sequence, cycling; indices wrap modulo `len`.
#[derive(Debug)]
pub struct SequenceRandom {
    indices: Vec<usize>,
    cursor: AtomicUsize,
}

impl SequenceRandom {
    pub fn new(indices: Vec<usize>) -> Self {
        Self {
            indices,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Counts 0, 1, 2, ... so consecutive draws walk every pool slot.
    pub fn counting() -> Self {
        Self::new(Vec::new())
    }
}

impl RandomSource for SequenceRandom {
    fn pick(&self, len: usize) -> usize {
        let n = self.cursor.fetch_add(1, Ordering::Relaxed);
        let raw = if self.indices.is_empty() {
            n
        } else {
            self.indices[n % self.indices.len()]
        };
        raw % len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_random_stays_in_range() {
        let r = ThreadRandom;
        for _ in 0..1000 {
            assert!(r.pick(3) < 3);
        }
    }

    #[test]
    fn seeded_random_is_reproducible() {
        let a = SeededRandom::new(42);
        let b = SeededRandom::new(42);
        let xs: Vec<usize> = (0..20).map(|_| a.pick(5)).collect();
        let ys: Vec<usize> = (0..20).map(|_| b.pick(5)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn sequence_random_cycles_and_wraps() {
        let r = SequenceRandom::new(vec![1, 4]);
        assert_eq!(r.pick(3), 1);
        assert_eq!(r.pick(3), 1); // 4 % 3
        assert_eq!(r.pick(3), 1);
        assert_eq!(r.pick(5), 4);
    }

    #[test]
    fn counting_walks_every_slot() {
        let r = SequenceRandom::counting();
        let picks: Vec<usize> = (0..6).map(|_| r.pick(3)).collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1, 2]);
    }
}
