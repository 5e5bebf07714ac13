//! Bounded experience replay memory.

use std::collections::VecDeque;

use rand::Rng;

use crate::env::StateVector;

/// One environment interaction, immutable once stored.
#[derive(Debug, Clone)]
pub struct Transition {
    /// State the action was taken in.
    pub state: StateVector,
    /// Action taken (stop ID).
    pub action: usize,
    /// Reward received.
    pub reward: f64,
    /// Resulting state.
    pub next_state: StateVector,
    /// Whether the episode terminated on this step.
    pub done: bool,
}

/// Fixed-capacity ring buffer of transitions.
///
/// Decouples experience generation from training: the agent samples uniform
/// random batches to decorrelate updates from the most recent episode.
/// Process-lifetime only — never persisted.
///
/// # Examples
///
/// ```
/// use q_routing::agent::ReplayMemory;
///
/// let memory = ReplayMemory::new(2000);
/// assert_eq!(memory.capacity(), 2000);
/// assert!(memory.is_empty());
/// ```
#[derive(Debug)]
pub struct ReplayMemory {
    buffer: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayMemory {
    /// Creates an empty memory with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Stores a transition, evicting the oldest once at capacity.
    pub fn store(&mut self, transition: Transition) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// Uniform random batch without replacement.
    ///
    /// Returns an empty vec when fewer than `batch_size` transitions are
    /// stored — insufficient data is not an error.
    pub fn sample<R: Rng>(&self, batch_size: usize, rng: &mut R) -> Vec<&Transition> {
        if self.buffer.len() < batch_size || batch_size == 0 {
            return Vec::new();
        }
        rand::seq::index::sample(rng, self.buffer.len(), batch_size)
            .iter()
            .map(|i| &self.buffer[i])
            .collect()
    }

    /// Number of stored transitions.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest stored transition, if any.
    pub fn oldest(&self) -> Option<&Transition> {
        self.buffer.front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn transition(reward: f64) -> Transition {
        let state = crate::env::StateVector::encode(0, 100.0, 0.0, 1.0, 1.0, &[true, false]);
        Transition {
            state: state.clone(),
            action: 1,
            reward,
            next_state: state,
            done: false,
        }
    }

    #[test]
    fn test_store_and_len() {
        let mut memory = ReplayMemory::new(10);
        assert!(memory.is_empty());
        memory.store(transition(1.0));
        memory.store(transition(2.0));
        assert_eq!(memory.len(), 2);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut memory = ReplayMemory::new(3);
        for i in 0..4 {
            memory.store(transition(i as f64));
        }
        assert_eq!(memory.len(), 3);
        // reward 0.0 (oldest) was evicted
        assert_eq!(memory.oldest().expect("non-empty").reward, 1.0);
    }

    #[test]
    fn test_size_never_exceeds_capacity() {
        let mut memory = ReplayMemory::new(5);
        for i in 0..50 {
            memory.store(transition(i as f64));
            assert!(memory.len() <= 5);
        }
    }

    #[test]
    fn test_sample_insufficient_is_empty() {
        let mut memory = ReplayMemory::new(10);
        memory.store(transition(1.0));
        let mut rng = StdRng::seed_from_u64(42);
        assert!(memory.sample(2, &mut rng).is_empty());
    }

    #[test]
    fn test_sample_without_replacement() {
        let mut memory = ReplayMemory::new(10);
        for i in 0..10 {
            memory.store(transition(i as f64));
        }
        let mut rng = StdRng::seed_from_u64(42);
        let batch = memory.sample(10, &mut rng);
        assert_eq!(batch.len(), 10);
        let mut rewards: Vec<i64> = batch.iter().map(|t| t.reward as i64).collect();
        rewards.sort();
        assert_eq!(rewards, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_sample_batch_size() {
        let mut memory = ReplayMemory::new(100);
        for i in 0..20 {
            memory.store(transition(i as f64));
        }
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(memory.sample(8, &mut rng).len(), 8);
    }
}
