//! Epsilon-greedy DQN agent with a target network.

use std::fs;
use std::path::Path;

use ndarray::Array2;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::env::StateVector;
use crate::{Error, Result};

use super::estimator::ValueEstimator;
use super::qnet::QNetwork;
use super::replay::{ReplayMemory, Transition};

/// Agent construction options.
#[derive(Debug, Clone)]
pub struct AgentOptions {
    /// Discount factor for future rewards.
    pub gamma: f64,
    /// Initial exploration rate.
    pub epsilon_start: f64,
    /// Exploration floor.
    pub epsilon_end: f64,
    /// Multiplicative decay applied after each replay update.
    pub epsilon_decay: f64,
    /// Estimator learning rate.
    pub learning_rate: f64,
    /// Replay batch size.
    pub batch_size: usize,
    /// Replay memory capacity.
    pub memory_size: usize,
    /// Hidden layer sizes for the bundled Q-network.
    pub hidden_layers: Vec<usize>,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            epsilon_start: 1.0,
            epsilon_end: 0.01,
            epsilon_decay: 0.995,
            learning_rate: 0.0005,
            batch_size: 64,
            memory_size: 10_000,
            hidden_layers: vec![128, 128],
        }
    }
}

/// A value-function agent: live estimator, periodically-synced target copy,
/// replay memory, and a decaying epsilon-greedy policy.
///
/// Exploration moves through `exploring → mixed → exploiting` purely via the
/// monotonic decay schedule; there are no externally triggered phase changes.
///
/// # Examples
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use q_routing::agent::{AgentOptions, DqnAgent};
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let agent = DqnAgent::new(7, 2, &AgentOptions::default(), &mut rng);
/// assert_eq!(agent.epsilon(), 1.0);
/// ```
pub struct DqnAgent<M: ValueEstimator = QNetwork> {
    live: M,
    target: M,
    memory: ReplayMemory,
    gamma: f64,
    epsilon: f64,
    epsilon_min: f64,
    epsilon_decay: f64,
    batch_size: usize,
}

impl DqnAgent<QNetwork> {
    /// Creates an agent with a freshly-initialized Q-network.
    pub fn new<R: Rng>(
        state_dim: usize,
        action_dim: usize,
        options: &AgentOptions,
        rng: &mut R,
    ) -> Self {
        let live = QNetwork::new(
            state_dim,
            &options.hidden_layers,
            action_dim,
            options.learning_rate,
            rng,
        );
        Self::from_estimator(live, options)
    }
}

impl<M: ValueEstimator + Clone> DqnAgent<M> {
    /// Wraps an existing estimator; the target starts as a copy of it.
    pub fn from_estimator(live: M, options: &AgentOptions) -> Self {
        let target = live.clone();
        Self {
            live,
            target,
            memory: ReplayMemory::new(options.memory_size),
            gamma: options.gamma,
            epsilon: options.epsilon_start,
            epsilon_min: options.epsilon_end,
            epsilon_decay: options.epsilon_decay,
            batch_size: options.batch_size,
        }
    }

    /// Chooses an action from `valid_actions` under the epsilon-greedy
    /// policy. Never returns an action outside the set.
    ///
    /// An empty set is a caller contract violation (the loop asked for an
    /// action on a finished episode) and fails with
    /// [`Error::EmptyActionSet`].
    pub fn act<R: Rng>(
        &self,
        state: &StateVector,
        valid_actions: &[usize],
        rng: &mut R,
    ) -> Result<usize> {
        if valid_actions.is_empty() {
            return Err(Error::EmptyActionSet);
        }
        if rng.random::<f64>() < self.epsilon {
            return Ok(*valid_actions.choose(rng).expect("set is non-empty"));
        }
        Ok(self.greedy_action(state, valid_actions))
    }

    /// Arg-max over the valid set; invalid actions are masked out entirely.
    /// Strictly-greater comparison makes ties resolve to the lowest stop ID,
    /// so greedy play is deterministic.
    fn greedy_action(&self, state: &StateVector, valid_actions: &[usize]) -> usize {
        let q = self.predict_state(state);
        let mut best = valid_actions[0];
        let mut best_q = f32::NEG_INFINITY;
        for &action in valid_actions {
            if q[action] > best_q {
                best_q = q[action];
                best = action;
            }
        }
        best
    }

    /// Stores a transition in replay memory.
    pub fn remember(&mut self, transition: Transition) {
        self.memory.store(transition);
    }

    /// One training update from a sampled batch.
    ///
    /// No-op (returns `None`) while the memory holds fewer than `batch_size`
    /// transitions. Otherwise computes TD targets against the **target**
    /// estimator, fits the live estimator, decays epsilon, and returns the
    /// batch loss.
    pub fn replay<R: Rng>(&mut self, rng: &mut R) -> Option<f32> {
        let batch = self.memory.sample(self.batch_size, rng);
        if batch.is_empty() {
            return None;
        }

        let state_dim = self.live.state_dim();
        let mut states = Array2::<f32>::zeros((batch.len(), state_dim));
        let mut next_states = Array2::<f32>::zeros((batch.len(), state_dim));
        for (i, t) in batch.iter().enumerate() {
            states.row_mut(i).assign(
                &ndarray::ArrayView1::from(t.state.features()),
            );
            next_states.row_mut(i).assign(
                &ndarray::ArrayView1::from(t.next_state.features()),
            );
        }

        let mut targets = self.live.predict(states.view());
        let next_q = self.target.predict(next_states.view());
        for (i, t) in batch.iter().enumerate() {
            let mut target = t.reward;
            if !t.done {
                let best_next = next_q
                    .row(i)
                    .iter()
                    .copied()
                    .fold(f32::NEG_INFINITY, f32::max);
                target += self.gamma * best_next as f64;
            }
            targets[[i, t.action]] = target as f32;
        }
        drop(batch);

        let loss = self.live.fit_step(states.view(), targets.view());
        self.epsilon = (self.epsilon * self.epsilon_decay).max(self.epsilon_min);
        Some(loss)
    }

    /// Copies live estimator parameters into the target copy.
    ///
    /// Called on a fixed episode cadence by the training loop; the frozen
    /// copy is what keeps TD targets stable between syncs.
    pub fn update_target(&mut self) {
        self.target = self.live.clone();
    }

    /// Current exploration rate.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Overrides the exploration rate (evaluation forces `0.0`).
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
    }

    /// The live estimator.
    pub fn estimator(&self) -> &M {
        &self.live
    }

    /// The replay memory.
    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    fn predict_state(&self, state: &StateVector) -> Vec<f32> {
        let features = state.features();
        let states = Array2::from_shape_vec((1, features.len()), features.to_vec())
            .expect("row shape matches feature length");
        self.live.predict(states.view()).row(0).to_vec()
    }
}

impl<M: ValueEstimator + Clone + Serialize + DeserializeOwned> DqnAgent<M> {
    /// Serializes the live estimator's parameters to `path`.
    ///
    /// Written atomically (temp file + rename). Replay memory, epsilon, and
    /// the target copy are deliberately not persisted.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let bytes = serde_json::to_vec(&self.live)?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Replaces the live estimator with parameters loaded from `path`.
    ///
    /// The target copy is left untouched — callers re-sync it (or not) as
    /// their workflow requires.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| Error::Checkpoint {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        self.live = serde_json::from_slice(&bytes).map_err(|e| Error::Checkpoint {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn state(unvisited: &[bool]) -> StateVector {
        StateVector::encode(0, 6000.0, 0.0, 1.0, 1.0, unvisited)
    }

    fn small_agent(seed: u64) -> DqnAgent<QNetwork> {
        let options = AgentOptions {
            batch_size: 4,
            memory_size: 100,
            hidden_layers: vec![16],
            ..AgentOptions::default()
        };
        let mut rng = StdRng::seed_from_u64(seed);
        DqnAgent::new(5 + 3, 3, &options, &mut rng)
    }

    fn transition(agent_state: &StateVector, action: usize, done: bool) -> Transition {
        Transition {
            state: agent_state.clone(),
            action,
            reward: 10.0,
            next_state: agent_state.clone(),
            done,
        }
    }

    #[test]
    fn test_act_empty_set_is_error() {
        let agent = small_agent(1);
        let mut rng = StdRng::seed_from_u64(1);
        let s = state(&[true, false, false]);
        assert!(matches!(
            agent.act(&s, &[], &mut rng),
            Err(Error::EmptyActionSet)
        ));
    }

    #[test]
    fn test_act_stays_in_valid_set() {
        let agent = small_agent(2); // epsilon = 1.0, pure exploration
        let mut rng = StdRng::seed_from_u64(2);
        let s = state(&[true, false, true]);
        for _ in 0..100 {
            let action = agent.act(&s, &[1, 2], &mut rng).expect("valid set");
            assert!(action == 1 || action == 2);
        }
    }

    #[test]
    fn test_act_greedy_is_deterministic() {
        let mut agent = small_agent(3);
        agent.set_epsilon(0.0);
        let mut rng = StdRng::seed_from_u64(3);
        let s = state(&[true, true, true]);
        let first = agent.act(&s, &[1, 2], &mut rng).expect("valid set");
        for _ in 0..20 {
            assert_eq!(
                agent.act(&s, &[1, 2], &mut rng).expect("valid set"),
                first
            );
        }
    }

    #[test]
    fn test_replay_noop_below_batch_size() {
        let mut agent = small_agent(4);
        let mut rng = StdRng::seed_from_u64(4);
        let s = state(&[true, true, true]);
        agent.remember(transition(&s, 1, false));
        assert!(agent.replay(&mut rng).is_none());
        assert_eq!(agent.epsilon(), 1.0); // no decay without an update
    }

    #[test]
    fn test_replay_updates_and_decays() {
        let mut agent = small_agent(5);
        let mut rng = StdRng::seed_from_u64(5);
        let s = state(&[true, true, true]);
        for _ in 0..8 {
            agent.remember(transition(&s, 1, false));
        }
        let loss = agent.replay(&mut rng);
        assert!(loss.is_some());
        assert!(agent.epsilon() < 1.0);
    }

    #[test]
    fn test_epsilon_non_increasing_with_floor() {
        let mut agent = small_agent(6);
        let mut rng = StdRng::seed_from_u64(6);
        let s = state(&[true, true, true]);
        for _ in 0..8 {
            agent.remember(transition(&s, 1, false));
        }
        let mut previous = agent.epsilon();
        for _ in 0..2000 {
            agent.replay(&mut rng);
            let current = agent.epsilon();
            assert!(current <= previous);
            assert!(current >= 0.01);
            previous = current;
        }
        assert!((agent.epsilon() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_update_target_syncs() {
        let mut agent = small_agent(7);
        let mut rng = StdRng::seed_from_u64(7);
        let s = state(&[true, true, true]);
        for _ in 0..8 {
            agent.remember(transition(&s, 1, false));
        }
        // drift the live estimator away from the target
        for _ in 0..20 {
            agent.replay(&mut rng);
        }
        let live_q = agent.predict_state(&s);
        agent.update_target();

        let features = s.features();
        let states = Array2::from_shape_vec((1, features.len()), features.to_vec()).expect("shape");
        let target_q = agent.target.predict(states.view()).row(0).to_vec();
        assert_eq!(live_q, target_q);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("checkpoints").join("dqn_final.json");

        let mut agent = small_agent(8);
        agent.set_epsilon(0.0);
        let mut rng = StdRng::seed_from_u64(8);
        let s = state(&[true, true, true]);
        let before = agent.act(&s, &[1, 2], &mut rng).expect("valid set");
        agent.save(&path).expect("save");

        let mut restored = small_agent(999); // different init
        restored.set_epsilon(0.0);
        restored.load(&path).expect("load");
        let after = restored.act(&s, &[1, 2], &mut rng).expect("valid set");
        assert_eq!(before, after);
    }

    #[test]
    fn test_load_missing_is_checkpoint_error() {
        let mut agent = small_agent(9);
        let err = agent.load("/nonexistent/checkpoint.json");
        assert!(matches!(err, Err(Error::Checkpoint { .. })));
    }
}
