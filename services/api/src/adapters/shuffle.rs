//! services/api/src/adapters/shuffle.rs
//!
//! `Shuffler` implementations backed by `rand`. Both use Fisher-Yates through
//! `SliceRandom::shuffle`, so every ordering is equally likely.

use quiz_core::domain::QuestionId;
use quiz_core::ports::Shuffler;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Mutex;

/// Shuffles with the thread-local, OS-seeded generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngShuffler;

impl Shuffler for ThreadRngShuffler {
    fn shuffle(&self, ids: &mut [QuestionId]) {
        ids.shuffle(&mut rand::thread_rng());
    }
}

/// Reproducible shuffles from a fixed seed, for demos and tests.
#[derive(Debug)]
pub struct SeededShuffler {
    rng: Mutex<StdRng>,
}

impl SeededShuffler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Shuffler for SeededShuffler {
    fn shuffle(&self, ids: &mut [QuestionId]) {
        // A poisoned lock only means another shuffle panicked; the RNG state is still usable.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        ids.shuffle(&mut *rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut ids: Vec<QuestionId>) -> Vec<QuestionId> {
        ids.sort_unstable();
        ids
    }

    #[test]
    fn shuffles_are_permutations() {
        let original: Vec<QuestionId> = (1..=20).collect();
        let shufflers: Vec<Box<dyn Shuffler>> = vec![
            Box::new(ThreadRngShuffler),
            Box::new(SeededShuffler::new(42)),
        ];
        for shuffler in shufflers {
            let mut ids = original.clone();
            shuffler.shuffle(&mut ids);
            assert_eq!(sorted(ids), original);
        }
    }

    #[test]
    fn same_seed_same_order() {
        let a = SeededShuffler::new(7);
        let b = SeededShuffler::new(7);
        let mut left: Vec<QuestionId> = (1..=10).collect();
        let mut right = left.clone();
        a.shuffle(&mut left);
        b.shuffle(&mut right);
        assert_eq!(left, right);
    }

    #[test]
    fn every_ordering_of_three_shows_up() {
        let shuffler = SeededShuffler::new(1);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..600 {
            let mut ids = vec![1, 2, 3];
            shuffler.shuffle(&mut ids);
            seen.insert(ids);
        }
        assert_eq!(seen.len(), 6);
    }
}
