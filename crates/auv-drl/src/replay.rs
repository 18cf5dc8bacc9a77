use std::collections::VecDeque;

use rand::{Rng, RngExt};

use crate::state::STATE_SIZE;

/// One observed transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Experience {
    pub state: [f32; STATE_SIZE],
    pub action: usize,
    pub reward: f32,
    pub next_state: [f32; STATE_SIZE],
    pub done: bool,
}

/// Bounded FIFO store of past transitions.
///
/// Once full, every push evicts the oldest transition.
pub struct ReplayBuffer {
    items: VecDeque<Experience>,
    capacity: usize,
}

impl ReplayBuffer {
    /// Create an empty buffer holding at most `capacity` transitions.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, exp: Experience) {
        if self.capacity == 0 {
            return;
        }
        while self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(exp);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Draw up to `n` distinct transitions uniformly at random.
    pub fn sample(&self, n: usize, rng: &mut impl Rng) -> Vec<&Experience> {
        let n = n.min(self.items.len());
        // Partial Fisher-Yates over the index range.
        let mut idx: Vec<usize> = (0..self.items.len()).collect();
        for i in 0..n {
            let j = rng.random_range(i..idx.len());
            idx.swap(i, j);
        }
        idx[..n].iter().map(|&i| &self.items[i]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn exp(reward: f32) -> Experience {
        Experience {
            state: [0.0; STATE_SIZE],
            action: 0,
            reward,
            next_state: [0.0; STATE_SIZE],
            done: false,
        }
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut buf = ReplayBuffer::new(3);
        for r in 0..5 {
            buf.push(exp(r as f32));
        }
        assert_eq!(buf.len(), 3);
        let rewards: Vec<f32> = buf.items.iter().map(|e| e.reward).collect();
        assert_eq!(rewards, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn sample_is_without_replacement() {
        let mut buf = ReplayBuffer::new(100);
        for r in 0..100 {
            buf.push(exp(r as f32));
        }
        let mut rng = SmallRng::seed_from_u64(9);
        let batch = buf.sample(64, &mut rng);
        assert_eq!(batch.len(), 64);
        let mut seen: Vec<i32> = batch.iter().map(|e| e.reward as i32).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 64);
    }

    #[test]
    fn sample_caps_at_len() {
        let mut buf = ReplayBuffer::new(10);
        buf.push(exp(1.0));
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(buf.sample(64, &mut rng).len(), 1);
    }
}
